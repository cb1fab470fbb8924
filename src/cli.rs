//! Command-line interface definitions for the news scraper.
//!
//! Every option is optional: anything not given on the command line (or via
//! its environment variable) falls back to the YAML config file, and then to
//! the built-in defaults in [`crate::config::ScraperConfig`].

use clap::Parser;

/// Command-line arguments for the news scraper.
///
/// # Examples
///
/// ```sh
/// # Scrape the default feed into ./scraped_news
/// news_scraper
///
/// # Another feed, four pages in flight, with a run manifest
/// news_scraper -f https://example.com/rss.xml -o ./out --concurrency 4 --manifest
///
/// # Site profile from a config file, plus a single combined digest
/// news_scraper -c site.yaml --combined ./scraped_news.txt
/// ```
#[derive(Parser, Debug, Default)]
#[command(author, version, about)]
pub struct Cli {
    /// RSS feed to discover articles from
    #[arg(short, long, env = "NEWS_SCRAPER_FEED_URL")]
    pub feed_url: Option<String>,

    /// Directory that receives one .txt file per article
    #[arg(short, long, env = "NEWS_SCRAPER_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Number of article pages fetched at the same time (1 = sequential)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Retries for transient network failures (0 disables retrying)
    #[arg(long)]
    pub retries: Option<usize>,

    /// CSS selector of the headline element on article pages
    #[arg(long)]
    pub headline_selector: Option<String>,

    /// CSS selector of the article body container
    #[arg(long)]
    pub body_selector: Option<String>,

    /// Also write every article into this single digest file
    #[arg(long)]
    pub combined: Option<String>,

    /// Write manifest.json describing the run into the output directory
    #[arg(long)]
    pub manifest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_nothing() {
        let cli = Cli::parse_from(["news_scraper"]);

        assert_eq!(cli.config, None);
        assert_eq!(cli.concurrency, None);
        assert!(!cli.manifest);
    }

    #[test]
    fn test_cli_long_flags() {
        let cli = Cli::parse_from([
            "news_scraper",
            "--feed-url",
            "https://example.com/rss.xml",
            "--output-dir",
            "./out",
            "--concurrency",
            "4",
            "--timeout-secs",
            "3",
            "--retries",
            "0",
            "--body-selector",
            "article",
            "--combined",
            "./all.txt",
            "--manifest",
        ]);

        assert_eq!(cli.feed_url.as_deref(), Some("https://example.com/rss.xml"));
        assert_eq!(cli.output_dir.as_deref(), Some("./out"));
        assert_eq!(cli.concurrency, Some(4));
        assert_eq!(cli.timeout_secs, Some(3));
        assert_eq!(cli.retries, Some(0));
        assert_eq!(cli.body_selector.as_deref(), Some("article"));
        assert_eq!(cli.combined.as_deref(), Some("./all.txt"));
        assert!(cli.manifest);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_scraper",
            "-f",
            "https://example.com/feed",
            "-o",
            "/tmp/news",
            "-c",
            "site.yaml",
        ]);

        assert_eq!(cli.feed_url.as_deref(), Some("https://example.com/feed"));
        assert_eq!(cli.output_dir.as_deref(), Some("/tmp/news"));
        assert_eq!(cli.config.as_deref(), Some("site.yaml"));
    }
}
