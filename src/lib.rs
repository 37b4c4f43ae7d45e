//! Crawls work.ua search results for a query and archives every job posting
//! to an xlsx file, reporting progress over a channel.

pub mod archiver;
pub mod config;
pub mod crawler;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod models;
pub mod parser;
pub mod progress;
pub mod retry;
pub mod site;
pub mod walker;
pub mod work_ua;

pub use config::{ItemFailurePolicy, Settings};
pub use crawler::{CancelToken, Crawl, CrawlHandle, CrawlOutcome, CrawlOptions, Session};
pub use error::{CrawlError, ExtractionCause, Result};
pub use fetcher::{Fetch, HttpFetcher};
pub use progress::{ProgressEmitter, ProgressTracker};
pub use models::{CrawlEvent, ItemLink, JobRecord, ListingSummary, ProgressEvent, Query, Resolved};
pub use site::{JobSite, SiteRegistry};
