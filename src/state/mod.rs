//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: Lifecycle of a crawl session (initializing, running, terminal states)
//! - `ProgressTracker` / `CrawlStatus`: Shared counters and their point-in-time snapshot
//! - `PageResult`: Immutable record of one crawled page

mod crawl_state;
mod page_result;
mod status;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_result::PageResult;
pub use status::{CrawlStatus, InFlightGuard, ProgressTracker};
