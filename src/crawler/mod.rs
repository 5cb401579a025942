//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The seed accessibility probe
//! - HTTP fetching and response classification
//! - HTML parsing and same-domain link extraction
//! - The frontier and the bounded-concurrency crawl coordination

mod coordinator;
mod fetcher;
mod handle;
mod parser;
mod probe;
mod scheduler;

pub use coordinator::{Coordinator, PageOutcome};
pub use fetcher::{build_http_client, fetch_page, FetchFailure, FetchResult};
pub use handle::{crawl, start_crawl, CrawlHandle};
pub use parser::extract_links;
pub use probe::{probe_url, ProbeResult};
pub use scheduler::Frontier;
