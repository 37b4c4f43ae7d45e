use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder written for optional fields that could not be extracted.
pub const SENTINEL: &str = "~~~";

/// Characters the search box never forwards to the site.
const STRIPPED_CHARS: [char; 2] = ['-', '/'];

/// A normalized search string: separators removed, whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Normalizes free text. The result may be empty; callers decide
    /// whether that is acceptable.
    pub fn normalize(raw: &str) -> Self {
        let stripped: String = raw.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
        Query(stripped.split_whitespace().collect::<Vec<_>>().join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Form-encoded form used in listing paths (`python developer` -> `python+developer`).
    pub fn slug(&self) -> String {
        url::form_urlencoded::byte_serialize(self.0.as_bytes()).collect()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub total_count: u64,
    pub total_pages: u32,
}

impl Default for ListingSummary {
    fn default() -> Self {
        Self { total_count: 0, total_pages: 1 }
    }
}

/// Outcome of a successful preflight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub query: Query,
    pub summary: ListingSummary,
    /// Headline shown to the user, e.g. "37 vacancies".
    pub message: String,
}

/// Absolute URL of one job detail page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemLink(pub String);

impl ItemLink {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub url: String,
    pub name: String,
    pub salary: String,
    pub company: String,
    pub address: String,
    pub terms: String,
    pub description: String,
}

impl JobRecord {
    pub const COLUMNS: [&'static str; 7] =
        ["url", "name", "salary", "company", "address", "terms", "description"];

    /// Cells in `COLUMNS` order.
    pub fn row(&self) -> [&str; 7] {
        [
            self.url.as_str(),
            self.name.as_str(),
            self.salary.as_str(),
            self.company.as_str(),
            self.address.as_str(),
            self.terms.as_str(),
            self.description.as_str(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub message: String,
    pub percent: u32,
}

/// Everything a crawl tells its caller, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Progress(ProgressEvent),
    /// Terminal signal of a successful run.
    Finished,
    /// Terminal signal of a failed or cancelled run.
    Failed(String),
}

impl CrawlEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CrawlEvent::Finished | CrawlEvent::Failed(_))
    }
}
