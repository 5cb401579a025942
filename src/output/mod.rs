//! Output module for reporting crawl progress and results
//!
//! This module handles:
//! - The `CrawlEvent` vocabulary emitted by the crawl engine
//! - Structured logging of events through `tracing`
//! - Console reports and human-readable transcript files

mod console;
mod log_sink;
mod traits;
mod transcript;

pub use console::ConsoleSink;
pub use log_sink::LogSink;
pub use traits::{CrawlEvent, EventSink, OutputError, OutputResult, SinkSet};
pub use transcript::TranscriptSink;
