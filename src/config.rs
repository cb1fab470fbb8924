//! Run configuration: built-in defaults, optional YAML file, CLI overrides.
//!
//! Precedence, lowest to highest:
//! 1. [`ScraperConfig::default`] (the Times of India "top stories" profile)
//! 2. Keys present in the YAML file given with `--config`
//! 3. Command-line flags and their environment variables
//!
//! ```yaml
//! feed_url: https://example.com/rss.xml
//! output_dir: ./out
//! concurrency: 4
//! selectors:
//!   headline: "h1.article-title"
//!   body: "div.article-body"
//! ```

use crate::cli::Cli;
use scraper::Selector;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const DEFAULT_FEED_URL: &str = "https://timesofindia.indiatimes.com/rssfeeds/-2128936835.cms";
pub const DEFAULT_OUTPUT_DIR: &str = "scraped_news";
pub const DEFAULT_HEADLINE_SELECTOR: &str = "h1.HNMDR";
pub const DEFAULT_BODY_SELECTOR: &str = r#"div[data-articlebody="1"]"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML in config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid CSS selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// CSS selectors identifying the headline and the body container of an article page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub headline: String,
    pub body: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            headline: DEFAULT_HEADLINE_SELECTOR.to_string(),
            body: DEFAULT_BODY_SELECTOR.to_string(),
        }
    }
}

/// Everything the pipeline driver needs for one run.
///
/// All fields use `#[serde(default)]`, so a config file may set any subset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// RSS feed to discover articles from.
    pub feed_url: String,
    /// Directory receiving one `.txt` file per article.
    pub output_dir: String,
    /// Article pages fetched at the same time; 1 keeps the run sequential.
    pub concurrency: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries for transient network failures.
    pub max_retries: usize,
    /// First backoff delay in milliseconds; doubles on each retry.
    pub retry_base_delay_ms: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
    pub selectors: SelectorConfig,
    /// Optional single file holding every article, in feed order.
    pub combined_output: Option<String>,
    /// Write `manifest.json` into `output_dir` after the run.
    pub write_manifest: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            concurrency: 1,
            timeout_secs: 10,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            user_agent: concat!("news_scraper/", env!("CARGO_PKG_VERSION")).to_string(),
            selectors: SelectorConfig::default(),
            combined_output: None,
            write_manifest: false,
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a YAML file.
    ///
    /// An empty file yields the defaults; unknown keys are ignored.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Build the effective configuration for a run from parsed CLI arguments.
    pub fn resolve(args: &Cli) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(Path::new(path))?,
            None => Self::default(),
        };
        config.apply_cli(args);
        config.validate()?;
        Ok(config)
    }

    /// Overlay any options given on the command line.
    pub fn apply_cli(&mut self, args: &Cli) {
        if let Some(feed_url) = &args.feed_url {
            self.feed_url = feed_url.clone();
        }
        if let Some(output_dir) = &args.output_dir {
            self.output_dir = output_dir.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.timeout_secs = timeout_secs;
        }
        if let Some(retries) = args.retries {
            self.max_retries = retries;
        }
        if let Some(headline) = &args.headline_selector {
            self.selectors.headline = headline.clone();
        }
        if let Some(body) = &args.body_selector {
            self.selectors.body = body.clone();
        }
        if let Some(combined) = &args.combined {
            self.combined_output = Some(combined.clone());
        }
        if args.manifest {
            self.write_manifest = true;
        }
    }

    /// Reject values that would make the run fail later in a confusing way.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feed_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "feed_url",
                message: "must not be empty".to_string(),
            });
        }
        if self.output_dir.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "output_dir",
                message: "must not be empty".to_string(),
            });
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid {
                field: "concurrency",
                message: "must be at least 1".to_string(),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                message: "must be at least 1".to_string(),
            });
        }
        parse_selector(&self.selectors.headline)?;
        parse_selector(&self.selectors.body)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Parse a CSS selector, turning the borrowed parser error into a [`ConfigError`].
pub fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
