//! Crawl progress tracking and point-in-time status snapshots
//!
//! The `ProgressTracker` is shared between the crawl engine (the only writer of
//! counters), fetch workers (in-flight accounting) and any number of readers
//! polling `CrawlStatus` snapshots.

use crate::state::{CrawlState, PageResult};
use crate::url::CanonicalUrl;
use crate::CrawlError;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::watch;

/// Point-in-time view of a crawl session
#[derive(Debug, Clone, Serialize)]
pub struct CrawlStatus {
    /// Lifecycle state
    pub state: CrawlState,

    /// Most recently dispatched URL
    pub current_url: Option<CanonicalUrl>,

    /// Pages fetched and parsed as HTML
    pub pages_crawled: u64,

    /// Pages fetched but not interesting (non-HTML, off-domain redirect)
    pub pages_skipped: u64,

    /// Failed fetches (timeouts, connection errors, HTTP >= 400)
    pub error_count: u64,

    /// Distinct canonical URLs seen so far (visited plus queued)
    pub total_discovered: usize,

    /// URLs waiting in the frontier
    pub frontier_size: usize,

    /// Fetches currently holding a concurrency slot
    pub in_flight: usize,

    /// Highest number of simultaneous in-flight fetches observed
    pub peak_in_flight: usize,

    /// Time since the session was created (frozen at the terminal state)
    pub elapsed: Duration,

    /// Human-readable reason for `invalid` and `error` states
    pub reason: Option<String>,
}

#[derive(Debug)]
struct Progress {
    state: CrawlState,
    current_url: Option<CanonicalUrl>,
    pages_crawled: u64,
    pages_skipped: u64,
    error_count: u64,
    total_discovered: usize,
    frontier_size: usize,
    finished_after: Option<Duration>,
    reason: Option<String>,
}

/// Shared progress counters of one crawl session
#[derive(Debug)]
pub struct ProgressTracker {
    progress: Mutex<Progress>,
    pages: Mutex<Vec<PageResult>>,
    record_pages: bool,
    started: Instant,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    state_tx: watch::Sender<CrawlState>,
}

impl ProgressTracker {
    /// Creates a tracker in the `Initializing` state
    ///
    /// # Arguments
    ///
    /// * `record_pages` - Whether crawled `PageResult`s are kept for `pages()`
    pub fn new(record_pages: bool) -> Self {
        let (state_tx, _) = watch::channel(CrawlState::Initializing);

        Self {
            progress: Mutex::new(Progress {
                state: CrawlState::Initializing,
                current_url: None,
                pages_crawled: 0,
                pages_skipped: 0,
                error_count: 0,
                total_discovered: 0,
                frontier_size: 0,
                finished_after: None,
                reason: None,
            }),
            pages: Mutex::new(Vec::new()),
            record_pages,
            started: Instant::now(),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            state_tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Progress> {
        self.progress.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribes to lifecycle state changes
    pub fn subscribe(&self) -> watch::Receiver<CrawlState> {
        self.state_tx.subscribe()
    }

    /// Returns the current lifecycle state
    pub fn state(&self) -> CrawlState {
        self.lock().state
    }

    /// Moves the session to `next`
    ///
    /// Fails with `InvalidTransition` if the step is not allowed, in particular
    /// when the session already reached a terminal state.
    pub fn transition(&self, next: CrawlState) -> Result<(), CrawlError> {
        let mut progress = self.lock();
        let current = progress.state;

        if !current.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        progress.state = next;
        if next.is_terminal() {
            progress.finished_after = Some(self.started.elapsed());
        }
        drop(progress);

        self.state_tx.send_replace(next);
        tracing::debug!("Crawl state: {} -> {}", current, next);
        Ok(())
    }

    /// Stores the reason shown for `invalid` and `error` sessions
    pub fn set_reason(&self, reason: impl Into<String>) {
        self.lock().reason = Some(reason.into());
    }

    /// Records a URL handed to a fetch worker
    pub fn record_dispatch(&self, url: &CanonicalUrl, frontier_size: usize, total_discovered: usize) {
        let mut progress = self.lock();
        progress.current_url = Some(url.clone());
        progress.frontier_size = frontier_size;
        progress.total_discovered = total_discovered;
    }

    /// Refreshes the frontier gauges
    pub fn record_frontier(&self, frontier_size: usize, total_discovered: usize) {
        let mut progress = self.lock();
        progress.frontier_size = frontier_size;
        progress.total_discovered = total_discovered;
    }

    /// Counts a crawled page and keeps its result if recording is enabled
    pub fn record_crawled(&self, page: PageResult) {
        self.lock().pages_crawled += 1;

        if self.record_pages {
            self.pages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(page);
        }
    }

    /// Counts a skipped page
    pub fn record_skipped(&self) {
        self.lock().pages_skipped += 1;
    }

    /// Counts a failed fetch
    pub fn record_error(&self) {
        self.lock().error_count += 1;
    }

    /// Marks one fetch as in flight until the returned guard is dropped
    pub fn enter_fetch(&self) -> InFlightGuard<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        InFlightGuard { tracker: self }
    }

    /// Time since the session was created, frozen once terminal
    pub fn elapsed(&self) -> Duration {
        self.lock()
            .finished_after
            .unwrap_or_else(|| self.started.elapsed())
    }

    /// Returns the recorded page results in completion order
    pub fn pages(&self) -> Vec<PageResult> {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Takes a consistent snapshot of all counters
    pub fn snapshot(&self) -> CrawlStatus {
        let progress = self.lock();

        CrawlStatus {
            state: progress.state,
            current_url: progress.current_url.clone(),
            pages_crawled: progress.pages_crawled,
            pages_skipped: progress.pages_skipped,
            error_count: progress.error_count,
            total_discovered: progress.total_discovered,
            frontier_size: progress.frontier_size,
            in_flight: self.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.peak_in_flight.load(Ordering::SeqCst),
            elapsed: progress
                .finished_after
                .unwrap_or_else(|| self.started.elapsed()),
            reason: progress.reason.clone(),
        }
    }
}

/// Keeps one fetch counted as in flight while alive
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    tracker: &'a ProgressTracker,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
