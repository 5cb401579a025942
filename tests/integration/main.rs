//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive full crawl
//! sessions end-to-end through the public API.

mod crawl_tests;
mod session_tests;

use nodrift::config::Config;
use nodrift::output::{CrawlEvent, EventSink, OutputResult, SinkSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sink that keeps every event for later assertions
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&CrawlEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Creates a test configuration with short timeouts
pub fn test_config(concurrency: usize) -> Config {
    let mut config = Config::with_concurrency(concurrency);
    config.crawler.request_timeout_ms = 2_000;
    config.crawler.probe_timeout_ms = 2_000;
    config
}

/// Sinks containing only a fresh recorder
pub fn recording_sinks() -> (Arc<RecordingSink>, SinkSet) {
    let recorder = Arc::new(RecordingSink::default());
    let sinks = SinkSet::new().with(recorder.clone());
    (recorder, sinks)
}

/// Answers every HEAD probe with 200
pub async fn mount_probe_ok(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "text/html"))
        .mount(server)
        .await;
}

/// Serves an HTML page with the given anchors
pub async fn mount_page(server: &MockServer, page_path: &str, hrefs: &[&str]) {
    mount_page_with(server, page_path, hrefs, ResponseTemplate::new(200)).await;
}

/// Serves an HTML page with the given anchors on top of a prepared template
pub async fn mount_page_with(
    server: &MockServer,
    page_path: &str,
    hrefs: &[&str],
    template: ResponseTemplate,
) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(template.set_body_raw(html_with_links(hrefs), "text/html"))
        .mount(server)
        .await;
}

/// Builds a small HTML document linking to every href
pub fn html_with_links(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();

    format!(
        "<html><head><title>Test</title></head><body>\n{}</body></html>",
        anchors
    )
}

/// Polls `condition` until it holds or the deadline passes
pub async fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
