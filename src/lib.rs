//! Nodrift: a single-domain web crawler
//!
//! This crate implements a breadth-first crawler that visits every page reachable
//! from a seed URL through same-domain hyperlinks, while keeping a fixed bound on
//! the number of simultaneous requests.

pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Nodrift operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Seed {url} is not accessible: {reason}")]
    SeedUnreachable { url: String, reason: String },

    #[error("Crawl engine fault: {0}")]
    EngineFault(String),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("URL is empty")]
    EmptyInput,

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Malformed URL: {0}")]
    MalformedUrl(String),
}

/// Result type alias for Nodrift operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, start_crawl, CrawlHandle};
pub use session::{SessionId, SessionStore};
pub use state::{CrawlState, CrawlStatus, PageResult};
pub use crate::url::{complete_and_validate, normalize_url, same_domain, CanonicalUrl};
