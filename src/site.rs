use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::{CrawlError, Result};
use crate::models::{ItemLink, JobRecord, Query, Resolved};

/// What a crawl needs from one job board.
pub trait JobSite: Send + Sync {
    fn id(&self) -> &'static str;

    /// Preflight: normalizes `raw`, fetches the first listing page and reads
    /// how many results and pages there are.
    fn resolve(&self, raw: &str) -> Result<Resolved>;

    /// Detail links on listing page `page` (1-based), in page order.
    fn page_links(&self, query: &Query, page: u32) -> Result<Vec<ItemLink>>;

    fn extract(&self, link: &ItemLink) -> Result<JobRecord>;
}

pub type SiteConstructor = fn(&Settings) -> Result<Arc<dyn JobSite>>;

pub struct SiteRegistry {
    sites: BTreeMap<&'static str, SiteConstructor>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self { sites: BTreeMap::new() }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crate::work_ua::SITE_ID, crate::work_ua::WorkUa::boxed);
        registry
    }

    pub fn register(&mut self, id: &'static str, ctor: SiteConstructor) {
        self.sites.insert(id, ctor);
    }

    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sites.keys().copied()
    }

    pub fn build(&self, id: &str, settings: &Settings) -> Result<Arc<dyn JobSite>> {
        let ctor = self.sites.get(id).ok_or_else(|| CrawlError::UnknownSite(id.to_string()))?;
        ctor(settings)
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
