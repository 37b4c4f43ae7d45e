use crossbeam_channel::Sender;
use tracing::debug;

use crate::models::{CrawlEvent, JobRecord, ProgressEvent};

/// Running count of extracted items against the total captured at
/// resolution time. The total is never re-estimated, so the percentage may
/// overshoot 100 or stop short of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressTracker {
    total: u64,
    processed: u64,
    last_percent: u32,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self { total, processed: 0, last_percent: 0 }
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn last_percent(&self) -> u32 {
        self.last_percent
    }

    pub fn advance(&mut self) -> u32 {
        self.processed += 1;
        // Nothing was expected, so there is nothing left to wait for.
        let percent = (self.processed * 100).checked_div(self.total).unwrap_or(100);
        self.last_percent = u32::try_from(percent).unwrap_or(u32::MAX);
        self.last_percent
    }
}

/// Sends crawl events to the caller. A caller that stopped listening does not
/// stop the crawl.
pub struct ProgressEmitter {
    tracker: ProgressTracker,
    events: Sender<CrawlEvent>,
}

impl ProgressEmitter {
    pub fn new(total: u64, events: Sender<CrawlEvent>) -> Self {
        Self { tracker: ProgressTracker::new(total), events }
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn on_item_extracted(&mut self, record: &JobRecord) {
        let percent = self.tracker.advance();
        self.send(CrawlEvent::Progress(ProgressEvent { message: format!("{} parsed!", record.url), percent }));
    }

    /// Reports the export with the last computed percentage.
    pub fn on_saved(&mut self, message: String) {
        let percent = self.tracker.last_percent();
        self.send(CrawlEvent::Progress(ProgressEvent { message, percent }));
    }

    pub fn finish(self) {
        self.send(CrawlEvent::Finished);
    }

    pub fn fail(self, message: String) {
        self.send(CrawlEvent::Failed(message));
    }

    fn send(&self, event: CrawlEvent) {
        if self.events.send(event).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}
