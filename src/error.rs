use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = CrawlError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("{0}")]
    Validation(String),

    #[error("An error occurred while executing the request to {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Could not read the page at {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("There are no vacancies for '{query}' yet.")]
    NotFound { query: String },

    #[error("An error occurred while parsing {url}: {cause}")]
    Extraction { url: String, cause: ExtractionCause },

    #[error("Cannot write to {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to save {}: {source}", .path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("The crawl was cancelled.")]
    Cancelled,

    #[error("A crawl is already running.")]
    Busy,

    #[error("Unknown site '{0}'")]
    UnknownSite(String),

    #[error("Cannot start the crawl worker: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("The crawl worker stopped unexpectedly.")]
    WorkerPanicked,
}

/// Why a page did not yield the fields it should have.
#[derive(Debug, Error)]
pub enum ExtractionCause {
    #[error("missing {0}")]
    Missing(&'static str),

    #[error("{0}")]
    Malformed(String),

    #[error("{0}")]
    Fetch(Box<CrawlError>),
}

impl CrawlError {
    pub fn extraction(url: impl Into<String>, cause: ExtractionCause) -> Self {
        CrawlError::Extraction { url: url.into(), cause }
    }

    /// Network failures, including ones that surfaced while extracting an item.
    pub fn is_transient(&self) -> bool {
        match self {
            CrawlError::Network { .. } => true,
            CrawlError::Extraction { cause: ExtractionCause::Fetch(inner), .. } => inner.is_transient(),
            _ => false,
        }
    }
}

impl From<CrawlError> for ExtractionCause {
    fn from(err: CrawlError) -> Self {
        ExtractionCause::Fetch(Box::new(err))
    }
}
