use crate::output::traits::{CrawlEvent, EventSink, OutputResult};
use std::io::Write;

/// Sink that prints crawled pages and the final summary to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    /// Print every crawled page with its links
    pub show_pages: bool,
}

impl ConsoleSink {
    pub fn new(show_pages: bool) -> Self {
        Self { show_pages }
    }
}

impl ConsoleSink {
    /// Writes the console lines for one event
    fn render(&self, out: &mut impl Write, event: &CrawlEvent) -> std::io::Result<()> {
        match event {
            CrawlEvent::CrawlStarted { seed } => {
                writeln!(out, "Starting crawl of: {}", seed)?;
            }
            CrawlEvent::PageCrawled { url, links, .. } if self.show_pages => {
                writeln!(out, "\nPage: {}", url)?;
                let mut sorted: Vec<_> = links.iter().collect();
                sorted.sort();
                for link in sorted {
                    writeln!(out, "  - {}", link)?;
                }
            }
            CrawlEvent::Error { url, detail } if self.show_pages => {
                writeln!(out, "\nError fetching {}: {}", url, detail)?;
            }
            CrawlEvent::InvalidSeed { url, reason } => {
                writeln!(out, "Error: invalid URL '{}': {}", url, reason)?;
            }
            CrawlEvent::Summary {
                pages_crawled,
                total_found,
                error_count,
                final_state,
                elapsed,
            } => {
                writeln!(out, "\nCrawl Summary:")?;
                writeln!(out, "Status: {}", final_state)?;
                writeln!(out, "Elapsed Time: {:.2} seconds", elapsed.as_secs_f64())?;
                writeln!(out, "Pages Crawled: {}", pages_crawled)?;
                writeln!(out, "URLs Found: {}", total_found)?;
                writeln!(out, "Errors: {}", error_count)?;
            }
            _ => {}
        }

        Ok(())
    }
}

impl EventSink for ConsoleSink {
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.render(&mut out, event)?;
        Ok(())
    }
}
