//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests to fetch page content
//! - Redirect handling
//! - Error classification

use crate::config::UserAgentConfig;
use crate::url::{same_domain, CanonicalUrl};
use reqwest::{header::CONTENT_TYPE, redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::{Position, Url};

/// Why a page fetch failed
///
/// Every variant counts as one crawl error; none of them aborts the crawl.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("redirect error: {0}")]
    Redirect(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("concurrency gate closed")]
    GateClosed,
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Success {
        /// Final URL after redirects, with the requested authority kept as
        /// written when the chain stayed on the same host
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Page answered but is not HTML (Content-Type mismatch)
    ContentMismatch {
        /// HTTP status code
        status_code: u16,
        /// The actual Content-Type received
        content_type: String,
    },

    /// Redirect chain left the host of the requested URL
    RedirectedOffDomain {
        /// HTTP status code of the final response
        status_code: u16,
        /// Where the chain ended
        final_url: String,
    },

    /// Timeout, transport error or HTTP status >= 400
    Failed(FetchFailure),
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `redirects` - Redirect policy; the seed probe uses `Policy::none()`
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. TLS backend failure)
///
/// # Example
///
/// ```no_run
/// use nodrift::config::UserAgentConfig;
/// use nodrift::crawler::build_http_client;
/// use reqwest::redirect::Policy;
///
/// let client = build_http_client(&UserAgentConfig::default(), Policy::limited(10)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, redirects: Policy) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(redirects)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches one page and classifies the response
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Timeout, connection or transport error | `Failed` |
/// | HTTP status >= 400 | `Failed(Status)` |
/// | Final URL on another host | `RedirectedOffDomain` |
/// | Status < 400, Content-Type not `text/html` | `ContentMismatch` |
/// | Status < 400, `text/html` | `Success` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use (redirects followed per its policy)
/// * `url` - The canonical URL to fetch
/// * `timeout` - Upper bound for the whole request including the body
pub async fn fetch_page(client: &Client, url: &CanonicalUrl, timeout: Duration) -> FetchResult {
    let requested = match url.to_url() {
        Ok(requested) => requested,
        Err(e) => return FetchResult::Failed(FetchFailure::Request(e.to_string())),
    };

    let response = match client.get(requested.clone()).timeout(timeout).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::Failed(classify_error(&e)),
    };

    let status = response.status();
    if status.as_u16() >= 400 {
        return FetchResult::Failed(FetchFailure::Status(status.as_u16()));
    }

    let final_url = final_page_url(url, &requested, response.url());
    if !same_domain(url.as_str(), &final_url) {
        return FetchResult::RedirectedOffDomain {
            status_code: status.as_u16(),
            final_url,
        };
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.to_ascii_lowercase().contains("text/html") {
        return FetchResult::ContentMismatch {
            status_code: status.as_u16(),
            content_type,
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        },
        Err(e) if e.is_timeout() => FetchResult::Failed(FetchFailure::Timeout),
        Err(e) => FetchResult::Failed(FetchFailure::Body(e.to_string())),
    }
}

/// Spells the URL a response came from in the requested URL's terms
///
/// The HTTP client reports the final URL in parsed form (host lowercased,
/// default port dropped). When scheme, host and port are unchanged the
/// requested scheme and authority are put back verbatim; otherwise the
/// redirect target is taken as the client reports it.
fn final_page_url(requested: &CanonicalUrl, requested_url: &Url, final_url: &Url) -> String {
    let same_origin = final_url.scheme() == requested_url.scheme()
        && final_url.host_str() == requested_url.host_str()
        && final_url.port() == requested_url.port();

    if same_origin {
        format!(
            "{}://{}{}",
            requested.scheme(),
            requested.authority(),
            &final_url[Position::BeforePath..]
        )
    } else {
        final_url.to_string()
    }
}

/// Maps a reqwest error to a fetch failure
fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect(error.to_string())
    } else if error.is_redirect() {
        FetchFailure::Redirect(error.to_string())
    } else {
        FetchFailure::Request(error.to_string())
    }
}
