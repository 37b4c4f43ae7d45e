use std::sync::Arc;

use tracing::{debug, info};
use url::Url;

use crate::config::Settings;
use crate::error::{CrawlError, ExtractionCause, Result};
use crate::fetcher::{Fetch, HttpFetcher};
use crate::models::{ItemLink, JobRecord, Query, Resolved};
use crate::parser;
use crate::site::JobSite;

pub const SITE_ID: &str = "work_ua";

pub struct WorkUa {
    base: Url,
    fetcher: Box<dyn Fetch>,
}

impl WorkUa {
    pub fn new(settings: &Settings) -> Result<Self> {
        let fetcher = HttpFetcher::new(settings)?;
        Self::with_fetcher(&settings.base_url, Box::new(fetcher))
    }

    pub fn with_fetcher(base_url: &str, fetcher: Box<dyn Fetch>) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| CrawlError::Validation(format!("Invalid base URL '{base_url}': {e}")))?;
        Ok(Self { base, fetcher })
    }

    pub fn boxed(settings: &Settings) -> Result<Arc<dyn JobSite>> {
        Ok(Arc::new(Self::new(settings)?))
    }

    /// `<base>/jobs-<slug>/`, with `?page=<n>` when a page is given.
    pub fn listing_url(&self, query: &Query, page: Option<u32>) -> String {
        let base = self.base.as_str().trim_end_matches('/');
        let mut url = format!("{base}/jobs-{}/", query.slug());
        if let Some(page) = page {
            url.push_str(&format!("?page={page}"));
        }
        url
    }

    fn absolute(&self, href: &str) -> std::result::Result<ItemLink, ExtractionCause> {
        self.base
            .join(href)
            .map(|url| ItemLink(url.into()))
            .map_err(|e| ExtractionCause::Malformed(format!("bad job link '{href}': {e}")))
    }
}

impl JobSite for WorkUa {
    fn id(&self) -> &'static str {
        SITE_ID
    }

    fn resolve(&self, raw: &str) -> Result<Resolved> {
        let query = Query::normalize(raw);
        if query.is_empty() {
            return Err(CrawlError::Validation("Select jobs".to_string()));
        }

        let url = self.listing_url(&query, None);
        info!(%query, %url, "Resolving query");
        let doc = self.fetcher.fetch(&url)?;

        let container = parser::listing_container(&doc)
            .map_err(|cause| CrawlError::extraction(&url, cause))?
            .ok_or_else(|| CrawlError::NotFound { query: query.to_string() })?;
        let (summary, message) =
            parser::summary(&doc, container).map_err(|cause| CrawlError::extraction(&url, cause))?;

        info!(total_count = summary.total_count, total_pages = summary.total_pages, "Query resolved");
        Ok(Resolved { query, summary, message })
    }

    fn page_links(&self, query: &Query, page: u32) -> Result<Vec<ItemLink>> {
        let url = self.listing_url(query, Some(page));
        let doc = self.fetcher.fetch(&url)?;

        let links: Vec<ItemLink> = parser::item_hrefs(&doc)
            .and_then(|hrefs| hrefs.iter().map(|href| self.absolute(href)).collect())
            .map_err(|cause| CrawlError::extraction(&url, cause))?;

        debug!(page, count = links.len(), "Listing page read");
        Ok(links)
    }

    fn extract(&self, link: &ItemLink) -> Result<JobRecord> {
        let url = link.as_str();
        let doc = self
            .fetcher
            .fetch(url)
            .map_err(|err| CrawlError::extraction(url, err.into()))?;
        parser::job_record(&doc, url).map_err(|cause| CrawlError::extraction(url, cause))
    }
}
