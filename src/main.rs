//! Nodrift main entry point
//!
//! This is the command-line interface for the Nodrift single-domain crawler.

use anyhow::Context;
use clap::Parser;
use nodrift::config::{load_config, Config};
use nodrift::output::{ConsoleSink, LogSink, SinkSet, TranscriptSink};
use nodrift::url::prepare_seed;
use nodrift::{start_crawl, CrawlError};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Nodrift: a single-domain web crawler
///
/// Nodrift visits every page reachable from a seed URL through same-domain
/// links, with a fixed bound on simultaneous requests, and prints the links
/// found on each page.
#[derive(Parser, Debug)]
#[command(name = "nodrift")]
#[command(version)]
#[command(about = "A single-domain, concurrency-bounded web crawler", long_about = None)]
struct Cli {
    /// Seed URL; the scheme may be omitted (example.com)
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of simultaneous requests (overrides the config file)
    #[arg(short = 'n', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Write a crawl transcript into this directory (overrides the config file)
    #[arg(long, value_name = "DIR")]
    transcript_dir: Option<String>,

    /// Only print the final summary, not every crawled page
    #[arg(long)]
    quiet_pages: bool,

    /// Validate the configuration and the seed, then exit without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;

    if cli.dry_run {
        return Ok(handle_dry_run(&cli.url, &config));
    }

    handle_crawl(&cli, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("nodrift=info,warn"),
            1 => EnvFilter::new("nodrift=debug,info"),
            2 => EnvFilter::new("nodrift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_requests = concurrency;
    }
    if let Some(dir) = &cli.transcript_dir {
        config.output.transcript_dir = Some(dir.clone());
    }

    Ok(config)
}

/// Handles the --dry-run mode: validates config and seed without network access
fn handle_dry_run(url: &str, config: &Config) -> ExitCode {
    println!("=== Nodrift Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Probe timeout: {}ms", config.crawler.probe_timeout_ms);
    println!("  Max redirects: {}", config.crawler.max_redirects);
    println!("  User agent: {}", config.user_agent.header_value());
    if let Some(dir) = &config.output.transcript_dir {
        println!("  Transcript directory: {}", dir);
    }

    if let Err(e) = nodrift::config::validate(config) {
        println!("\n✗ {}", e);
        return ExitCode::FAILURE;
    }

    match prepare_seed(url) {
        Ok(seed) => {
            println!("\n✓ Configuration is valid");
            println!("✓ Would start crawling at {}", seed);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("\n✗ Invalid URL '{}': {}", url, e);
            ExitCode::FAILURE
        }
    }
}

/// Handles the main crawl operation
async fn handle_crawl(cli: &Cli, config: Config) -> anyhow::Result<ExitCode> {
    let mut sinks = SinkSet::new()
        .with(Arc::new(LogSink))
        .with(Arc::new(ConsoleSink::new(!cli.quiet_pages)));

    if let Some(dir) = &config.output.transcript_dir {
        let target = prepare_seed(&cli.url)
            .map(|seed| seed.to_string())
            .unwrap_or_else(|_| cli.url.clone());
        let transcript = TranscriptSink::create(Path::new(dir), &target)
            .with_context(|| format!("failed to create transcript in {}", dir))?;
        tracing::info!("Writing transcript to {}", transcript.path().display());
        sinks.push(Arc::new(transcript));
    }

    let handle = match start_crawl(&cli.url, config, sinks) {
        Ok(handle) => handle,
        Err(CrawlError::Url(e)) => {
            tracing::error!("Invalid URL '{}': {}", cli.url, e);
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("failed to start crawl"),
    };

    // Ctrl-C requests a cooperative stop
    let stopper = handle.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.stop();
        }
    });

    let status = handle.wait().await;

    if let Some(reason) = &status.reason {
        tracing::warn!("Crawl ended {}: {}", status.state, reason);
    }

    if status.state.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
