//! Human-readable crawl transcript written to a text file
//!
//! One file per session, named `crawl_<domain>_<YYYYmmdd_HHMMSS>.txt`, with a
//! session header, one entry per page event and a closing summary block.

use crate::output::traits::{CrawlEvent, EventSink, OutputResult};
use chrono::Local;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const RULE: &str = "================================================================================";

/// Sink that records a crawl transcript
pub struct TranscriptSink {
    path: PathBuf,
    target: String,
    writer: Mutex<BufWriter<File>>,
}

impl TranscriptSink {
    /// Creates the transcript file inside `dir` and writes the session header
    ///
    /// # Arguments
    ///
    /// * `dir` - Directory for transcripts, created if missing
    /// * `target` - The crawl target, used in the header and the file name
    pub fn create(dir: &Path, target: &str) -> OutputResult<Self> {
        fs::create_dir_all(dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = dir.join(format!("crawl_{}_{}.txt", file_label(target), timestamp));
        let file = File::create(&path)?;

        let sink = Self {
            path,
            target: target.to_string(),
            writer: Mutex::new(BufWriter::new(file)),
        };
        sink.write_header()?;

        Ok(sink)
    }

    /// Path of the transcript file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_lines(&self, level: &str, lines: &[String]) -> OutputResult<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");

        for line in lines {
            writeln!(writer, "{} - {} - {}", stamp, level, line)?;
        }

        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        self.writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()?;
        Ok(())
    }

    fn write_header(&self) -> OutputResult<()> {
        self.write_lines(
            "INFO",
            &[
                RULE.to_string(),
                "NODRIFT WEB CRAWLER - SESSION START".to_string(),
                RULE.to_string(),
                format!("Target URL: {}", self.target),
                format!("Start Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
                format!("Log File: {}", self.path.display()),
                RULE.to_string(),
            ],
        )?;
        self.flush()
    }
}

impl EventSink for TranscriptSink {
    fn handle(&self, event: &CrawlEvent) -> OutputResult<()> {
        match event {
            CrawlEvent::CrawlStarted { seed } => {
                self.write_lines("INFO", &[format!("STARTED: {}", seed)])?;
            }
            CrawlEvent::PageCrawled { url, links, status } => {
                let mut sorted: Vec<_> = links.iter().collect();
                sorted.sort();

                let mut lines = Vec::with_capacity(sorted.len() + 3);
                lines.push(format!("CRAWLED: {} (Status: {})", url, status));
                lines.push(format!("  → Found {} links:", sorted.len()));
                lines.extend(sorted.iter().map(|link| format!("    • {}", link)));
                lines.push(String::new());
                self.write_lines("INFO", &lines)?;
            }
            CrawlEvent::PageSkipped {
                url,
                reason,
                status,
            } => {
                let status_info = status
                    .map(|s| format!(" (Status: {})", s))
                    .unwrap_or_default();
                self.write_lines("INFO", &[format!("SKIPPED: {}{} - {}", url, status_info, reason)])?;
            }
            CrawlEvent::Error { url, detail } => {
                self.write_lines("ERROR", &[format!("ERROR: {} - {}", url, detail)])?;
            }
            CrawlEvent::InvalidSeed { url, reason } => {
                self.write_lines("ERROR", &[format!("INVALID URL: '{}' - {}", url, reason)])?;
                self.flush()?;
            }
            CrawlEvent::Progress {
                pages_crawled,
                total_found,
                elapsed,
            } => {
                self.write_lines(
                    "INFO",
                    &[format!(
                        "PROGRESS: {} pages crawled, {} URLs found, {:.2}s elapsed",
                        pages_crawled,
                        total_found,
                        elapsed.as_secs_f64()
                    )],
                )?;
            }
            CrawlEvent::Summary {
                pages_crawled,
                total_found,
                error_count,
                final_state,
                elapsed,
            } => {
                let secs = elapsed.as_secs_f64();
                let mut lines = vec![
                    RULE.to_string(),
                    "CRAWLING SESSION SUMMARY".to_string(),
                    RULE.to_string(),
                    format!("Target URL: {}", self.target),
                    format!("Final Status: {}", final_state.as_str().to_uppercase()),
                    format!("Pages Successfully Crawled: {}", pages_crawled),
                    format!("Total URLs Found: {}", total_found),
                    format!("Errors Encountered: {}", error_count),
                    format!("Total Elapsed Time: {:.2} seconds", secs),
                ];
                if *pages_crawled > 0 {
                    lines.push(format!(
                        "Average Time per Page: {:.2} seconds",
                        secs / *pages_crawled as f64
                    ));
                }
                lines.push(format!("End Time: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
                lines.push(RULE.to_string());

                self.write_lines("INFO", &lines)?;
                self.flush()?;
            }
        }

        Ok(())
    }
}

/// Derives a short file-name-safe label from a URL or host
fn file_label(target: &str) -> String {
    let host = crate::url::extract_authority(target.trim()).unwrap_or("unknown");

    host.trim_start_matches("www.")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(20)
        .collect()
}
