use std::collections::VecDeque;

use tracing::info;

use crate::error::Result;
use crate::models::{ItemLink, Query};
use crate::retry::RetryPolicy;
use crate::site::JobSite;

/// Lazily walks listing pages `1..=total_pages`, fetching a page only when
/// the links of the previous one are used up. Stops for good after the
/// first error.
pub struct ListingWalker<'a> {
    site: &'a dyn JobSite,
    query: &'a Query,
    total_pages: u32,
    next_page: u32,
    pending: VecDeque<ItemLink>,
    retry: RetryPolicy,
    done: bool,
}

impl<'a> ListingWalker<'a> {
    pub fn new(site: &'a dyn JobSite, query: &'a Query, total_pages: u32) -> Self {
        Self {
            site,
            query,
            total_pages,
            next_page: 1,
            pending: VecDeque::new(),
            retry: RetryPolicy::NONE,
            done: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Last page requested so far, 0 before the first fetch.
    pub fn current_page(&self) -> u32 {
        self.next_page - 1
    }
}

impl Iterator for ListingWalker<'_> {
    type Item = Result<ItemLink>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(link) = self.pending.pop_front() {
                return Some(Ok(link));
            }
            if self.done || self.next_page > self.total_pages {
                return None;
            }

            let page = self.next_page;
            self.next_page += 1;
            info!(page, total_pages = self.total_pages, "Fetching listing page");

            match self.retry.run("listing page", || self.site.page_links(self.query, page)) {
                Ok(links) => self.pending.extend(links),
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
