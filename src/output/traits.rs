//! Crawl event types and the sink trait
//!
//! The crawl engine reports everything it does as `CrawlEvent`s. Sinks consume
//! them (logging, console output, transcripts, remote status APIs) but never
//! take part in frontier or concurrency decisions.

use crate::state::CrawlState;
use crate::url::CanonicalUrl;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Something that happened during a crawl session
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// The session was created for a validated seed
    CrawlStarted { seed: CanonicalUrl },

    /// An HTML page was fetched and its same-domain links extracted
    PageCrawled {
        url: CanonicalUrl,
        links: Vec<CanonicalUrl>,
        status: u16,
    },

    /// A page was fetched but not expanded (non-HTML, off-domain redirect)
    PageSkipped {
        url: CanonicalUrl,
        reason: String,
        status: Option<u16>,
    },

    /// A fetch failed (timeout, connection error, HTTP status >= 400)
    Error { url: CanonicalUrl, detail: String },

    /// The seed was rejected by validation or the accessibility probe
    InvalidSeed { url: String, reason: String },

    /// Periodic progress report
    Progress {
        pages_crawled: u64,
        total_found: usize,
        elapsed: Duration,
    },

    /// Final report, emitted exactly once at the terminal transition
    Summary {
        pages_crawled: u64,
        total_found: usize,
        error_count: u64,
        final_state: CrawlState,
        elapsed: Duration,
    },
}

/// Trait for crawl event consumers
///
/// Sinks are shared between the engine task and callers, so implementations
/// must be thread-safe. A failing sink is logged and otherwise ignored.
pub trait EventSink: Send + Sync {
    /// Handles a single event
    ///
    /// # Arguments
    ///
    /// * `event` - The event to record
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()>;
}

/// Fans every event out to a list of sinks
#[derive(Clone, Default)]
pub struct SinkSet {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl SinkSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink to the set
    pub fn with(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Adds a sink to the set in place
    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Number of sinks in the set
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if the set has no sinks
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Delivers an event to every sink, logging failures
    pub fn emit(&self, event: &CrawlEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.handle(event) {
                tracing::warn!("Event sink failed: {}", e);
            }
        }
    }
}

impl EventSink for SinkSet {
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()> {
        self.emit(event);
        Ok(())
    }
}

/// One event of every kind, for exercising sinks
#[cfg(test)]
pub(crate) fn every_event() -> Vec<CrawlEvent> {
    let url = |u: &str| crate::url::normalize_url(u).unwrap();

    vec![
        CrawlEvent::CrawlStarted {
            seed: url("https://example.com"),
        },
        CrawlEvent::PageCrawled {
            url: url("https://example.com"),
            links: vec![url("https://example.com/b"), url("https://example.com/a")],
            status: 200,
        },
        CrawlEvent::PageSkipped {
            url: url("https://example.com/data.json"),
            reason: "non-HTML content type application/json".to_string(),
            status: Some(200),
        },
        CrawlEvent::Error {
            url: url("https://example.com/gone"),
            detail: "HTTP status 404".to_string(),
        },
        CrawlEvent::InvalidSeed {
            url: "https://nowhere.example".to_string(),
            reason: "timed out".to_string(),
        },
        CrawlEvent::Progress {
            pages_crawled: 2,
            total_found: 4,
            elapsed: Duration::from_millis(900),
        },
        CrawlEvent::Summary {
            pages_crawled: 3,
            total_found: 4,
            error_count: 1,
            final_state: CrawlState::Completed,
            elapsed: Duration::from_millis(1500),
        },
    ]
}
