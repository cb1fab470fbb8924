//! # News Scraper
//!
//! Discovers article URLs in an RSS feed, fetches every article page, extracts
//! its headline and body text with site-specific selectors, and saves each
//! article as a text file.
//!
//! ## Usage
//!
//! ```sh
//! news_scraper -f https://timesofindia.indiatimes.com/rssfeeds/-2128936835.cms -o ./scraped_news
//! ```
//!
//! ## Architecture
//!
//! 1. **Indexing**: Read the feed and pull an article URL out of each item
//! 2. **Fetching**: Download each page and extract headline and body
//!    (sequential by default, bounded parallelism with `--concurrency`)
//! 3. **Output**: One `.txt` file per article, plus optional digest and manifest
//!
//! A feed that cannot be fetched ends the run with an error. A single article
//! that cannot be fetched never does: its file records the failure instead.

use clap::Parser;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use news_scraper::cli::Cli;
use news_scraper::config::ScraperConfig;
use news_scraper::http::{HttpFetcher, RetryFetch};
use news_scraper::pipeline;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_scraper starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match ScraperConfig::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        feed_url = %config.feed_url,
        output_dir = %config.output_dir,
        concurrency = config.concurrency,
        timeout_secs = config.timeout_secs,
        max_retries = config.max_retries,
        "Resolved configuration"
    );

    let http = HttpFetcher::new(config.timeout(), &config.user_agent)?;
    let fetcher = RetryFetch::new(http, config.max_retries, config.retry_base_delay());

    let summary = match pipeline::run(&config, &fetcher).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(feed_url = %config.feed_url, error = %e, "Run failed");
            return Err(e);
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        articles = summary.written,
        failed = summary.failed,
        output_dir = %Path::new(&config.output_dir).display(),
        "Execution complete"
    );

    Ok(())
}
