use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Nodrift
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Default configuration with a custom concurrency limit
    pub fn with_concurrency(max_concurrent_requests: usize) -> Self {
        let mut config = Self::default();
        config.crawler.max_concurrent_requests = max_concurrent_requests;
        config
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of simultaneous in-flight fetches
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,

    /// Timeout of a page GET (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Timeout of the seed accessibility probe (milliseconds)
    #[serde(rename = "probe-timeout-ms")]
    pub probe_timeout_ms: u64,

    /// Redirects followed by page fetches
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Whether per-page results are kept in the session
    #[serde(rename = "record-pages")]
    pub record_pages: bool,

    /// Emit a progress event every N completed fetches
    #[serde(rename = "progress-every")]
    pub progress_every: u64,
}

impl CrawlerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 10,
            request_timeout_ms: 10_000,
            probe_timeout_ms: 10_000,
            max_redirects: 10,
            record_pages: true,
            progress_every: 1,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!("{}/{} (+{})", self.crawler_name, self.crawler_version, contact),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "nodrift".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for human-readable crawl transcripts; disabled when unset
    #[serde(rename = "transcript-dir")]
    pub transcript_dir: Option<String>,
}
