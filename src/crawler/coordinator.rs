//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl engine that drives one session from the seed
//! probe to its terminal state:
//! - Probing the seed before any resources are committed
//! - Owning the frontier and visited set (single writer: the dispatch loop)
//! - Running bounded-concurrency fetch-and-expand workers
//! - Reporting counters and events, and emitting the final summary once

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchFailure, FetchResult};
use crate::crawler::parser::extract_links;
use crate::crawler::probe::probe_url;
use crate::crawler::scheduler::Frontier;
use crate::output::{CrawlEvent, SinkSet};
use crate::state::{CrawlState, PageResult, ProgressTracker};
use crate::url::CanonicalUrl;
use crate::CrawlError;
use reqwest::{redirect::Policy, Client};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// What a fetch-and-expand worker hands back to the dispatch loop
#[derive(Debug)]
pub enum PageOutcome {
    /// HTML page fetched; `links` keeps first-discovery order for the frontier
    Crawled {
        page: PageResult,
        links: Vec<CanonicalUrl>,
    },

    /// Fetched but not expanded; not an error
    Skipped { reason: String, status: Option<u16> },

    /// Counted as one crawl error
    Failed(FetchFailure),
}

/// The shared HTTP session of one crawl
///
/// Opened once after the seed is accepted and closed when dropped, whichever
/// way the dispatch loop exits.
struct Transport {
    client: Client,
}

impl Transport {
    fn open(config: &Config) -> Result<Self, CrawlError> {
        let client = build_http_client(
            &config.user_agent,
            Policy::limited(config.crawler.max_redirects),
        )
        .map_err(|e| CrawlError::EngineFault(format!("failed to open HTTP transport: {}", e)))?;

        tracing::debug!("HTTP transport opened");
        Ok(Self { client })
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        tracing::debug!("HTTP transport closed");
    }
}

/// Main crawl engine of one session
pub struct Coordinator {
    seed: CanonicalUrl,
    config: Arc<Config>,
    tracker: Arc<ProgressTracker>,
    sinks: SinkSet,
    cancel: CancellationToken,
    open_transport: fn(&Config) -> Result<Transport, CrawlError>,
}

impl Coordinator {
    /// Creates a coordinator for a validated seed
    ///
    /// # Arguments
    ///
    /// * `seed` - The canonical seed URL
    /// * `config` - Validated configuration
    /// * `tracker` - Progress counters shared with status readers
    /// * `sinks` - Event consumers
    /// * `cancel` - Cooperative stop signal
    pub fn new(
        seed: CanonicalUrl,
        config: Arc<Config>,
        tracker: Arc<ProgressTracker>,
        sinks: SinkSet,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            seed,
            config,
            tracker,
            sinks,
            cancel,
            open_transport: Transport::open,
        }
    }

    /// Runs the session to its terminal state and returns that state
    ///
    /// The summary event is emitted exactly once, right after the terminal
    /// transition.
    pub async fn run(self) -> CrawlState {
        let state = match self.execute().await {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Crawl of {} failed: {}", self.seed, e);
                self.tracker.set_reason(e.to_string());
                CrawlState::Error
            }
        };

        self.finish(state)
    }

    async fn execute(&self) -> Result<CrawlState, CrawlError> {
        let probe_client = build_http_client(&self.config.user_agent, Policy::none())
            .map_err(|e| CrawlError::EngineFault(format!("failed to build probe client: {}", e)))?;

        let probe = tokio::select! {
            probe = probe_url(
                &probe_client,
                self.seed.as_str(),
                self.config.crawler.probe_timeout(),
            ) => probe,
            _ = self.cancel.cancelled() => {
                tracing::info!("Stop requested while probing {}", self.seed);
                return Ok(CrawlState::Stopped);
            }
        };

        if !probe.accessible {
            let rejection = CrawlError::SeedUnreachable {
                url: self.seed.to_string(),
                reason: probe.reason.clone(),
            };
            tracing::warn!("{}", rejection);
            self.sinks.emit(&CrawlEvent::InvalidSeed {
                url: self.seed.to_string(),
                reason: probe.reason.clone(),
            });
            self.tracker.set_reason(probe.reason);
            return Ok(CrawlState::Invalid);
        }

        if self.cancel.is_cancelled() {
            return Ok(CrawlState::Stopped);
        }

        self.tracker.transition(CrawlState::Running)?;
        tracing::info!("Seed {} accepted ({}), crawl running", self.seed, probe.reason);

        let transport = (self.open_transport)(&self.config)?;
        self.dispatch_loop(&transport).await
    }

    /// The fetch-and-expand loop
    ///
    /// Runs while the frontier is non-empty or fetches are in flight. Only this
    /// loop mutates the frontier; workers return their outcome and never see it.
    async fn dispatch_loop(&self, transport: &Transport) -> Result<CrawlState, CrawlError> {
        let limit = self.config.crawler.max_concurrent_requests;
        let progress_every = self.config.crawler.progress_every.max(1);
        let timeout = self.config.crawler.request_timeout();

        let gate = Arc::new(Semaphore::new(limit));
        let mut frontier = Frontier::with_seed(self.seed.clone());
        let mut workers: JoinSet<(CanonicalUrl, PageOutcome)> = JoinSet::new();
        let mut in_flight: HashMap<Id, CanonicalUrl> = HashMap::new();
        let mut completed: u64 = 0;
        let mut stop_seen = false;

        self.tracker
            .record_frontier(frontier.len(), frontier.total_discovered());

        loop {
            // Stop is observed before any further work is dispatched
            while !self.cancel.is_cancelled() && workers.len() < limit {
                let Some(url) = frontier.next_unvisited() else {
                    break;
                };

                self.tracker
                    .record_dispatch(&url, frontier.len(), frontier.total_discovered());
                tracing::debug!("Dispatching {} ({} queued)", url, frontier.len());

                let task = workers.spawn(fetch_and_expand(
                    url.clone(),
                    transport.client.clone(),
                    gate.clone(),
                    self.tracker.clone(),
                    timeout,
                ));
                in_flight.insert(task.id(), url);
            }

            if workers.is_empty() {
                break;
            }

            let joined = tokio::select! {
                joined = workers.join_next_with_id() => joined,
                _ = self.cancel.cancelled(), if !stop_seen => {
                    stop_seen = true;
                    tracing::info!(
                        "Stop requested, waiting for {} in-flight fetches",
                        workers.len()
                    );
                    continue;
                }
            };

            let expand = !self.cancel.is_cancelled();
            match joined {
                Some(Ok((id, (url, outcome)))) => {
                    in_flight.remove(&id);
                    self.record(url, outcome, &mut frontier, expand);
                }
                Some(Err(e)) => {
                    let url = in_flight.remove(&e.id());
                    self.record_worker_failure(url, &e);
                }
                None => break,
            }

            self.tracker
                .record_frontier(frontier.len(), frontier.total_discovered());

            completed += 1;
            if completed % progress_every == 0 {
                let status = self.tracker.snapshot();
                self.sinks.emit(&CrawlEvent::Progress {
                    pages_crawled: status.pages_crawled,
                    total_found: status.total_discovered,
                    elapsed: status.elapsed,
                });
            }
        }

        if self.cancel.is_cancelled() {
            tracing::info!(
                "Crawl stopped with {} URLs left in the frontier",
                frontier.len()
            );
            Ok(CrawlState::Stopped)
        } else {
            tracing::info!("Frontier is empty, crawl complete");
            Ok(CrawlState::Completed)
        }
    }

    /// Applies one worker outcome to counters, events and the frontier
    fn record(
        &self,
        url: CanonicalUrl,
        outcome: PageOutcome,
        frontier: &mut Frontier,
        expand: bool,
    ) {
        match outcome {
            PageOutcome::Crawled { page, links } => {
                self.sinks.emit(&CrawlEvent::PageCrawled {
                    url,
                    links: page.links().to_vec(),
                    status: page.status(),
                });
                self.tracker.record_crawled(page);

                if expand {
                    let added = frontier.extend(links);
                    tracing::debug!("Queued {} new URLs", added);
                }
            }
            PageOutcome::Skipped { reason, status } => {
                self.tracker.record_skipped();
                self.sinks.emit(&CrawlEvent::PageSkipped {
                    url,
                    reason,
                    status,
                });
            }
            PageOutcome::Failed(failure) => {
                self.tracker.record_error();
                self.sinks.emit(&CrawlEvent::Error {
                    url,
                    detail: failure.to_string(),
                });
            }
        }
    }

    /// Counts a worker that died before returning an outcome as one error
    fn record_worker_failure(&self, url: Option<CanonicalUrl>, error: &JoinError) {
        self.tracker.record_error();

        match url {
            Some(url) => {
                tracing::error!("Fetch worker for {} failed: {}", url, error);
                self.sinks.emit(&CrawlEvent::Error {
                    url,
                    detail: format!("fetch worker failed: {}", error),
                });
            }
            None => tracing::error!("Fetch worker failed: {}", error),
        }
    }

    fn finish(&self, state: CrawlState) -> CrawlState {
        if let Err(e) = self.tracker.transition(state) {
            tracing::error!("Could not finish crawl of {}: {}", self.seed, e);
        }

        let status = self.tracker.snapshot();
        self.sinks.emit(&CrawlEvent::Summary {
            pages_crawled: status.pages_crawled,
            total_found: status.total_discovered,
            error_count: status.error_count,
            final_state: status.state,
            elapsed: status.elapsed,
        });

        status.state
    }
}

/// Fetches one URL inside a concurrency slot and classifies the result
async fn fetch_and_expand(
    url: CanonicalUrl,
    client: Client,
    gate: Arc<Semaphore>,
    tracker: Arc<ProgressTracker>,
    timeout: Duration,
) -> (CanonicalUrl, PageOutcome) {
    let _permit = match gate.acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => return (url, PageOutcome::Failed(FetchFailure::GateClosed)),
    };
    let _in_flight = tracker.enter_fetch();

    let outcome = match fetch_page(&client, &url, timeout).await {
        FetchResult::Success {
            final_url,
            status_code,
            body,
            ..
        } => {
            let links = extract_links(&final_url, &body);
            PageOutcome::Crawled {
                page: PageResult::new(url.clone(), links.clone(), status_code),
                links,
            }
        }
        FetchResult::ContentMismatch {
            status_code,
            content_type,
        } => PageOutcome::Skipped {
            reason: if content_type.is_empty() {
                "missing content type".to_string()
            } else {
                format!("non-HTML content type {}", content_type)
            },
            status: Some(status_code),
        },
        FetchResult::RedirectedOffDomain {
            status_code,
            final_url,
        } => PageOutcome::Skipped {
            reason: format!("redirected off-domain to {}", final_url),
            status: Some(status_code),
        },
        FetchResult::Failed(failure) => PageOutcome::Failed(failure),
    };

    (url, outcome)
}
