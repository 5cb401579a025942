//! Public entry points of the crawl engine
//!
//! `start_crawl` validates the seed synchronously, spawns the engine on the
//! current tokio runtime and returns a `CrawlHandle` that can be polled for
//! status, stopped, and awaited.

use crate::config::{validate, Config};
use crate::crawler::coordinator::Coordinator;
use crate::output::{CrawlEvent, SinkSet};
use crate::state::{CrawlStatus, PageResult, ProgressTracker};
use crate::url::{prepare_seed, CanonicalUrl};
use crate::CrawlError;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Handle to a running (or finished) crawl session
///
/// Cloning is cheap; all clones observe and control the same session.
#[derive(Debug, Clone)]
pub struct CrawlHandle {
    seed: CanonicalUrl,
    tracker: Arc<ProgressTracker>,
    cancel: CancellationToken,
    finished: watch::Receiver<bool>,
}

impl CrawlHandle {
    /// The canonical seed of this session
    pub fn seed(&self) -> &CanonicalUrl {
        &self.seed
    }

    /// Point-in-time snapshot, safe to call while the crawl runs
    pub fn status(&self) -> CrawlStatus {
        self.tracker.snapshot()
    }

    /// Page results recorded so far, in completion order
    pub fn pages(&self) -> Vec<PageResult> {
        self.tracker.pages()
    }

    /// Requests cooperative cancellation
    ///
    /// No new fetches are dispatched after this call; fetches already in
    /// flight run to completion but their links are not followed. Calling it
    /// more than once, or after the crawl finished, has no effect.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!("Stop requested for crawl of {}", self.seed);
        }
        self.cancel.cancel();
    }

    /// Returns true once the engine has reached its terminal state and
    /// emitted the summary
    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Waits for the session to finish and returns the final snapshot
    pub async fn wait(&self) -> CrawlStatus {
        let mut finished = self.finished.clone();
        if finished.wait_for(|done| *done).await.is_err() {
            tracing::error!("Crawl task of {} ended unexpectedly", self.seed);
        }
        self.tracker.snapshot()
    }
}

/// Starts a crawl in the background
///
/// The seed goes through completion, validation and canonicalization before any
/// network access; a bad seed is reported as an `InvalidSeed` event and returned
/// as an error without creating a session.
///
/// Must be called from within a tokio runtime.
///
/// # Arguments
///
/// * `seed` - User-entered seed (`example.com`, `https://example.com/docs`, ...)
/// * `config` - Crawl configuration; `Config::with_concurrency(n)` sets the limit
/// * `sinks` - Consumers of the crawl events
///
/// # Example
///
/// ```no_run
/// use nodrift::output::{LogSink, SinkSet};
/// use nodrift::{start_crawl, Config};
/// use std::sync::Arc;
///
/// # async fn run() -> nodrift::Result<()> {
/// let handle = start_crawl(
///     "example.com",
///     Config::with_concurrency(5),
///     SinkSet::new().with(Arc::new(LogSink)),
/// )?;
/// let status = handle.wait().await;
/// println!("{} pages crawled", status.pages_crawled);
/// # Ok(())
/// # }
/// ```
pub fn start_crawl(seed: &str, config: Config, sinks: SinkSet) -> Result<CrawlHandle, CrawlError> {
    validate(&config)?;

    let canonical = match prepare_seed(seed) {
        Ok(canonical) => canonical,
        Err(e) => {
            sinks.emit(&CrawlEvent::InvalidSeed {
                url: seed.to_string(),
                reason: e.to_string(),
            });
            return Err(e.into());
        }
    };

    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| CrawlError::EngineFault(format!("no async runtime available: {}", e)))?;

    let tracker = Arc::new(ProgressTracker::new(config.crawler.record_pages));
    let cancel = CancellationToken::new();
    let (done_tx, done_rx) = watch::channel(false);

    sinks.emit(&CrawlEvent::CrawlStarted {
        seed: canonical.clone(),
    });

    let coordinator = Coordinator::new(
        canonical.clone(),
        Arc::new(config),
        tracker.clone(),
        sinks,
        cancel.clone(),
    );

    let label = canonical.clone();
    runtime.spawn(async move {
        let state = coordinator.run().await;
        tracing::debug!("Crawl of {} finished: {}", label, state);
        done_tx.send_replace(true);
    });

    Ok(CrawlHandle {
        seed: canonical,
        tracker,
        cancel,
        finished: done_rx,
    })
}

/// Runs a crawl to completion and returns the final snapshot
///
/// # Arguments
///
/// * `seed` - User-entered seed URL
/// * `config` - Crawl configuration
/// * `sinks` - Consumers of the crawl events
pub async fn crawl(seed: &str, config: Config, sinks: SinkSet) -> Result<CrawlStatus, CrawlError> {
    let handle = start_crawl(seed, config, sinks)?;
    Ok(handle.wait().await)
}
