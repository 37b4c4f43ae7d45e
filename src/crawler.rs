//! One crawl run: walk the listing, extract every job, export, report.
//!
//! A run is strictly sequential and owns its counters and records. It runs on
//! its own thread when started through [`Crawl::spawn`] or a [`Session`]; the
//! caller only sees the event channel and a cancel flag.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{error, info, warn};

use crate::archiver;
use crate::config::{ItemFailurePolicy, Settings};
use crate::error::{CrawlError, Result};
use crate::models::{CrawlEvent, JobRecord, Resolved};
use crate::progress::ProgressEmitter;
use crate::retry::RetryPolicy;
use crate::site::JobSite;
use crate::walker::ListingWalker;

/// Cooperative stop request, honoured before each listing page and each item.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    pub max_delay: Duration,
    pub on_item_error: ItemFailurePolicy,
    pub retry: RetryPolicy,
    pub output_dir: PathBuf,
}

impl CrawlOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_delay: Duration::from_millis(settings.max_delay_ms),
            on_item_error: settings.on_item_error,
            retry: RetryPolicy::from_settings(settings),
            output_dir: settings.output_dir(),
        }
    }
}

/// Clears the in-flight flag however the run ends.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// What a finished run produced: the exported file and its rows, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub path: PathBuf,
    pub records: Vec<JobRecord>,
}

pub struct Crawl {
    site: Arc<dyn JobSite>,
    resolved: Resolved,
    options: CrawlOptions,
    cancel: CancelToken,
    running_guard: Option<RunningGuard>,
}

impl Crawl {
    pub fn new(site: Arc<dyn JobSite>, resolved: Resolved, options: CrawlOptions) -> Self {
        Self { site, resolved, options, cancel: CancelToken::default(), running_guard: None }
    }

    /// A run that clears `running` before it sends its terminal event.
    fn guarded(site: Arc<dyn JobSite>, resolved: Resolved, options: CrawlOptions, running: Arc<AtomicBool>) -> Self {
        Self { running_guard: Some(RunningGuard(running)), ..Self::new(site, resolved, options) }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs to completion on the current thread. On success the last events are
    /// the file-saved message and `Finished`; on failure a single `Failed`.
    pub fn run(mut self, events: Sender<CrawlEvent>) -> Result<CrawlOutcome> {
        let mut emitter = ProgressEmitter::new(self.resolved.summary.total_count, events);
        let outcome = self.collect(&mut emitter).and_then(|records| {
            let path = self.export(&records, &mut emitter)?;
            Ok(CrawlOutcome { path, records })
        });

        // The caller may start the next run as soon as it sees the terminal event.
        drop(self.running_guard.take());

        match outcome {
            Ok(outcome) => {
                emitter.finish();
                Ok(outcome)
            }
            Err(err) => {
                error!(error = %err, "Crawl failed");
                emitter.fail(err.to_string());
                Err(err)
            }
        }
    }

    pub fn spawn(self) -> Result<CrawlHandle> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let cancel = self.cancel_token();
        let join = thread::Builder::new()
            .name(format!("crawl-{}", self.site.id()))
            .spawn(move || self.run(tx))
            .map_err(CrawlError::Spawn)?;

        Ok(CrawlHandle { events: rx, cancel, join })
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            info!("Crawl cancelled");
            return Err(CrawlError::Cancelled);
        }
        Ok(())
    }

    fn pause(&self) {
        let max_ms = u64::try_from(self.options.max_delay.as_millis()).unwrap_or(u64::MAX);
        if max_ms > 0 {
            thread::sleep(Duration::from_millis(fastrand::u64(0..max_ms)));
        }
    }

    fn collect(&self, emitter: &mut ProgressEmitter) -> Result<Vec<JobRecord>> {
        let Resolved { query, summary, .. } = &self.resolved;
        info!(%query, total_count = summary.total_count, total_pages = summary.total_pages, "Crawl started");

        let mut walker =
            ListingWalker::new(self.site.as_ref(), query, summary.total_pages).with_retry(self.options.retry);
        let mut records = Vec::new();
        let mut first = true;

        loop {
            self.check_cancelled()?;
            let Some(link) = walker.next() else { break };
            let link = link?;

            if !first {
                self.pause();
                self.check_cancelled()?;
            }
            first = false;

            match self.options.retry.run("job page", || self.site.extract(&link)) {
                Ok(record) => {
                    info!(url = %record.url, page = walker.current_page(), "Job parsed");
                    emitter.on_item_extracted(&record);
                    records.push(record);
                }
                Err(err) if self.options.on_item_error == ItemFailurePolicy::Skip => {
                    warn!(url = %link, error = %err, "Skipping job");
                }
                Err(err) => return Err(err),
            }
        }

        info!(parsed = records.len(), "Listing exhausted");
        Ok(records)
    }

    fn export(&self, records: &[JobRecord], emitter: &mut ProgressEmitter) -> Result<PathBuf> {
        let dir = &self.options.output_dir;
        let path = archiver::save_to_file(records, &self.resolved.query, dir)?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        emitter.on_saved(format!("File '{name}' is saved to {}.", dir.display()));
        Ok(path)
    }
}

/// A crawl running on its own thread.
pub struct CrawlHandle {
    events: Receiver<CrawlEvent>,
    cancel: CancelToken,
    join: JoinHandle<Result<CrawlOutcome>>,
}

impl CrawlHandle {
    pub fn events(&self) -> &Receiver<CrawlEvent> {
        &self.events
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Blocks until the run ends.
    pub fn wait(self) -> Result<CrawlOutcome> {
        self.join.join().map_err(|_| CrawlError::WorkerPanicked)?
    }
}

/// Check-then-run gate over one site: a crawl may only start after a
/// successful [`Session::check`], and only one crawl is in flight at a time.
pub struct Session {
    site: Arc<dyn JobSite>,
    options: CrawlOptions,
    resolved: Option<Resolved>,
    running: Arc<AtomicBool>,
}

impl Session {
    pub fn new(site: Arc<dyn JobSite>, options: CrawlOptions) -> Self {
        Self { site, options, resolved: None, running: Arc::new(AtomicBool::new(false)) }
    }

    pub fn site(&self) -> &dyn JobSite {
        self.site.as_ref()
    }

    pub fn resolved(&self) -> Option<&Resolved> {
        self.resolved.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Resolves `raw` and returns the headline to show. A failed check
    /// forgets any earlier successful one.
    pub fn check(&mut self, raw: &str) -> Result<String> {
        self.resolved = None;
        let resolved = self.site.resolve(raw)?;
        let message = resolved.message.clone();
        self.resolved = Some(resolved);
        Ok(message)
    }

    pub fn start(&mut self) -> Result<CrawlHandle> {
        let resolved = self
            .resolved
            .clone()
            .ok_or_else(|| CrawlError::Validation("Check the query before parsing.".to_string()))?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(CrawlError::Busy);
        }

        Crawl::guarded(Arc::clone(&self.site), resolved, self.options.clone(), Arc::clone(&self.running)).spawn()
    }
}
