//! Seed accessibility probe
//!
//! A single header-only request made before a crawl commits any resources. The
//! probe never follows redirects: a redirect status is enough to accept the seed.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Outcome of an accessibility probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Whether the crawl may proceed
    pub accessible: bool,

    /// Human-readable explanation
    pub reason: String,

    /// HTTP status of the probe response, if one was received
    pub status: Option<u16>,
}

impl ProbeResult {
    fn accepted(status: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            accessible: true,
            reason: reason.into(),
            status: Some(status.as_u16()),
        }
    }

    fn rejected(status: Option<StatusCode>, reason: impl Into<String>) -> Self {
        Self {
            accessible: false,
            reason: reason.into(),
            status: status.map(|s| s.as_u16()),
        }
    }
}

/// Checks that a seed URL answers before crawling it
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | HTTP 200 | accessible |
/// | HTTP 301/302/303/307/308 | accessible (target not followed) |
/// | Any other status | not accessible, reason carries the status |
/// | Timeout | not accessible, "timed out" |
/// | DNS failure / connection refused | not accessible, connection failure |
/// | Malformed URL | not accessible |
///
/// # Arguments
///
/// * `client` - A client built with redirects disabled
/// * `url` - The URL to probe
/// * `timeout` - Upper bound for the whole request
pub async fn probe_url(client: &Client, url: &str, timeout: Duration) -> ProbeResult {
    let parsed = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => parsed,
        _ => return ProbeResult::rejected(None, format!("malformed URL: {}", url)),
    };

    tracing::debug!("Probing {}", parsed);

    match client.head(parsed).timeout(timeout).send().await {
        Ok(response) => classify_status(response.status()),
        Err(e) if e.is_timeout() => ProbeResult::rejected(None, "timed out"),
        Err(e) if e.is_connect() => {
            ProbeResult::rejected(None, format!("connection failed: {}", root_cause(&e)))
        }
        Err(e) if e.is_builder() => ProbeResult::rejected(None, format!("malformed URL: {}", url)),
        Err(e) => ProbeResult::rejected(None, format!("request failed: {}", root_cause(&e))),
    }
}

fn classify_status(status: StatusCode) -> ProbeResult {
    match status {
        StatusCode::OK => ProbeResult::accepted(status, "URL is accessible"),
        StatusCode::MOVED_PERMANENTLY
        | StatusCode::FOUND
        | StatusCode::SEE_OTHER
        | StatusCode::TEMPORARY_REDIRECT
        | StatusCode::PERMANENT_REDIRECT => {
            ProbeResult::accepted(status, format!("URL redirects (status {})", status.as_u16()))
        }
        _ => ProbeResult::rejected(
            Some(status),
            format!("URL returned status code {}", status.as_u16()),
        ),
    }
}

/// Innermost error message of a reqwest error chain
fn root_cause(error: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}
