//! Configuration module for Nodrift
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; missing values fall back to the defaults.
//!
//! # Example
//!
//! ```no_run
//! use nodrift::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("nodrift.toml")).unwrap();
//! println!("Concurrency limit: {}", config.crawler.max_concurrent_requests);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
