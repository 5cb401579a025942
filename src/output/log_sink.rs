use crate::output::traits::{CrawlEvent, EventSink, OutputResult};

/// Sink that turns crawl events into `tracing` events
///
/// This is the default sink of every crawl: page-level events are logged at
/// `info`/`debug`, failures at `warn`, rejected seeds at `error`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()> {
        match event {
            CrawlEvent::CrawlStarted { seed } => {
                tracing::info!("Starting crawl of {}", seed);
            }
            CrawlEvent::PageCrawled { url, links, status } => {
                tracing::info!(%url, status, links = links.len(), "Page crawled");
            }
            CrawlEvent::PageSkipped {
                url,
                reason,
                status,
            } => {
                tracing::debug!(%url, ?status, "Page skipped: {}", reason);
            }
            CrawlEvent::Error { url, detail } => {
                tracing::warn!(%url, "Fetch failed: {}", detail);
            }
            CrawlEvent::InvalidSeed { url, reason } => {
                tracing::error!("Invalid seed '{}': {}", url, reason);
            }
            CrawlEvent::Progress {
                pages_crawled,
                total_found,
                elapsed,
            } => {
                tracing::debug!(
                    "Progress: {} pages crawled, {} URLs found, {:.2}s elapsed",
                    pages_crawled,
                    total_found,
                    elapsed.as_secs_f64()
                );
            }
            CrawlEvent::Summary {
                pages_crawled,
                total_found,
                error_count,
                final_state,
                elapsed,
            } => {
                tracing::info!(
                    "Crawl {}: {} pages crawled, {} URLs found, {} errors in {:.2}s",
                    final_state,
                    pages_crawled,
                    total_found,
                    error_count,
                    elapsed.as_secs_f64()
                );
            }
        }

        Ok(())
    }
}
