//! work.ua markup rules. Everything here is a pure function of a parsed page.

use scraper::{ElementRef, Html, Selector};

use crate::error::ExtractionCause;
use crate::models::{JobRecord, ListingSummary, SENTINEL};

const LISTING_CONTAINER: &str = "div[class='card']";
const PAGINATION: &str = "ul.pagination.hidden-xs";
const PAGINATION_ENTRY: &str = "li";
const ITEM_CARD: &str = "div[class='card card-hover card-visited wordwrap job-link']";
const ITEM_ANCHOR: &str = "a";

const TITLE: &str = "h1#h1-name.add-top-sm";
const SALARY_MARKER: &str = "span[title='Зарплата']";
const COMPANY_MARKER: &str = "span[title='Дані про компанію']";
const ADDRESS_MARKER: &str = "span[title='Адреса роботи']";
const REMOTE_MARKER: &str = "span[title='Місце роботи']";
const TERMS_MARKER: &str = "span[title='Умови й вимоги']";
const DESCRIPTION: &str = "div#job-description";

/// The result headline is the third element nested in the listing container.
const HEADLINE_POSITION: usize = 2;

fn selector(css: &'static str) -> Result<Selector, ExtractionCause> {
    Selector::parse(css).map_err(|e| ExtractionCause::Malformed(format!("bad selector {css}: {e:?}")))
}

fn select_first<'a>(scope: ElementRef<'a>, css: &'static str) -> Result<Option<ElementRef<'a>>, ExtractionCause> {
    Ok(scope.select(&selector(css)?).next())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Root-level scope for document-wide lookups.
fn root(doc: &Html) -> ElementRef<'_> {
    doc.root_element()
}

pub fn listing_container(doc: &Html) -> Result<Option<ElementRef<'_>>, ExtractionCause> {
    select_first(root(doc), LISTING_CONTAINER)
}

/// First run of ASCII digits in `text`.
pub fn first_number(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..].chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Headline text and the summary derived from it and from the pagination widget.
pub fn summary(doc: &Html, container: ElementRef<'_>) -> Result<(ListingSummary, String), ExtractionCause> {
    let headline = container
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .nth(HEADLINE_POSITION)
        .map(element_text)
        .ok_or(ExtractionCause::Missing("result count headline"))?;

    let total_count = first_number(&headline)
        .ok_or_else(|| ExtractionCause::Malformed(format!("no result count in '{headline}'")))?;

    let summary = ListingSummary { total_count, total_pages: total_pages(doc)? };
    Ok((summary, headline))
}

/// The widget's last entry is the "next" control, so the last page number is
/// the entry before it. No widget means a single page.
pub fn total_pages(doc: &Html) -> Result<u32, ExtractionCause> {
    let Some(pagination) = select_first(root(doc), PAGINATION)? else {
        return Ok(1);
    };

    let entries: Vec<_> = pagination.select(&selector(PAGINATION_ENTRY)?).collect();
    let last_page = entries
        .len()
        .checked_sub(2)
        .map(|i| element_text(entries[i]))
        .ok_or(ExtractionCause::Missing("last page entry in pagination"))?;

    last_page
        .parse()
        .map_err(|_| ExtractionCause::Malformed(format!("page number '{last_page}' is not an integer")))
}

/// `href` of the first anchor of every job card on a listing page, in page
/// order. Cards without a link are left out.
pub fn item_hrefs(doc: &Html) -> Result<Vec<String>, ExtractionCause> {
    let anchor = selector(ITEM_ANCHOR)?;
    let hrefs = doc
        .select(&selector(ITEM_CARD)?)
        .filter_map(|card| card.select(&anchor).next())
        .filter_map(|a| a.value().attr("href"))
        .map(str::to_string)
        .collect();
    Ok(hrefs)
}

/// Text of the element right after the marker; sentinel when the marker is absent.
fn value_after(doc: &Html, marker_css: &'static str, what: &'static str) -> Result<String, ExtractionCause> {
    let Some(marker) = select_first(root(doc), marker_css)? else {
        return Ok(SENTINEL.to_string());
    };
    marker
        .next_siblings()
        .find_map(ElementRef::wrap)
        .map(element_text)
        .ok_or(ExtractionCause::Missing(what))
}

fn address(doc: &Html) -> Result<String, ExtractionCause> {
    if let Some(marker) = select_first(root(doc), ADDRESS_MARKER)? {
        let sibling = marker.next_sibling().ok_or(ExtractionCause::Missing("work address value"))?;
        let text = match ElementRef::wrap(sibling) {
            Some(el) => element_text(el),
            None => sibling.value().as_text().map(|t| t.trim().to_string()).unwrap_or_default(),
        };
        return Ok(text);
    }

    if let Some(marker) = select_first(root(doc), REMOTE_MARKER)? {
        return marker
            .parent()
            .and_then(ElementRef::wrap)
            .map(element_text)
            .ok_or(ExtractionCause::Missing("remote work block"));
    }

    Ok(SENTINEL.to_string())
}

pub fn job_record(doc: &Html, url: &str) -> Result<JobRecord, ExtractionCause> {
    let name = select_first(root(doc), TITLE)?
        .map(element_text)
        .ok_or(ExtractionCause::Missing("job title"))?;
    let salary = value_after(doc, SALARY_MARKER, "salary value")?;
    let company = value_after(doc, COMPANY_MARKER, "company value")?;
    let address = address(doc)?;

    // Unlike salary/company/address, terms and description have no sentinel.
    let terms = select_first(root(doc), TERMS_MARKER)?
        .and_then(|marker| marker.parent())
        .and_then(ElementRef::wrap)
        .map(element_text)
        .ok_or(ExtractionCause::Missing("conditions and requirements"))?;
    let description = select_first(root(doc), DESCRIPTION)?
        .map(element_text)
        .ok_or(ExtractionCause::Missing("job description"))?;

    Ok(JobRecord { url: url.to_string(), name, salary, company, address, terms, description })
}
