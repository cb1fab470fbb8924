//! Page fetching with exponential backoff retry logic.
//!
//! Every network call in the crate goes through the [`FetchPage`] trait, so
//! the feed reader and the article extractor never touch `reqwest` directly.
//!
//! # Architecture
//!
//! - [`FetchPage`]: Core trait, "GET this URL and give me the body text"
//! - [`HttpFetcher`]: `reqwest` implementation with a per-request timeout
//! - [`RetryFetch`]: Decorator that retries transient failures of any [`FetchPage`]
//!
//! # Retry Strategy
//!
//! - Only transient failures are retried: timeouts, connection errors,
//!   HTTP 429 and HTTP 5xx
//! - Exponential backoff starting at `base_delay`, capped at 30 seconds
//! - Random jitter (0-250ms) added to every delay

use rand::{Rng, rng};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Errors raised while fetching a page.
///
/// The `Display` text of these errors is what ends up in an article file
/// after `"Failed to retrieve article: "`, so keep the messages readable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URL could not be parsed or is not http(s)
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// DNS, TCP or TLS failure before a response was received
    #[error("Connection failed: {0}")]
    Connect(String),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Any other client error (body decoding, redirect loops, builder errors)
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl FetchError {
    /// Classify a `reqwest` error into the variant callers care about.
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() {
            FetchError::Connect(e.to_string())
        } else {
            FetchError::Request(e)
        }
    }

    /// Whether a later attempt has a reasonable chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout | FetchError::Connect(_) => true,
            FetchError::HttpStatus(status) => *status == 429 || (500..600).contains(status),
            FetchError::InvalidUrl(_) | FetchError::Request(_) => false,
        }
    }
}

/// Trait for async page fetching.
///
/// Implementors take an absolute URL and return the response body as text.
/// This abstraction allows decorators (like retry logic) and test doubles.
pub trait FetchPage {
    /// Fetch `url` and return its body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// [`FetchPage`] implementation backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: StdDuration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let t0 = Instant::now();
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        // Error pages are never handed to the extractor: a 404 or 500 page
        // becomes a failure record rather than a "No title found" article.
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(FetchError::from_reqwest)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchPage`] implementation.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying fetcher to wrap.
    inner: T,
    /// Maximum number of retries after the first attempt.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    /// Create a new retry wrapper around an existing [`FetchPage`] implementation.
    ///
    /// `max_retries = 0` disables retrying entirely.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage,
{
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        if self.max_retries > 0 {
                            error!(
                                attempt,
                                max = self.max_retries,
                                elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                                error = %e,
                                "fetch() exhausted retries"
                            );
                        }
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fails with the given errors in order, then succeeds.
    struct ScriptedFetcher {
        calls: AtomicUsize,
        failures: Mutex<VecDeque<FetchError>>,
    }

    impl ScriptedFetcher {
        fn new(failures: Vec<FetchError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures: Mutex::new(failures.into()),
            }
        }
    }

    impl FetchPage for ScriptedFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.failures.lock().unwrap().pop_front();
            match next {
                Some(e) => Err(e),
                None => Ok("ok".to_string()),
            }
        }
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(StdDuration::from_secs(5), "news_scraper-test").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&mock_server)
            .await;

        let body = fetcher().fetch(&mock_server.uri()).await.unwrap();
        assert_eq!(body, "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_fetch_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = fetcher().fetch(&mock_server.uri()).await;
        assert!(matches!(result, Err(FetchError::HttpStatus(404))));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(StdDuration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let fetcher = HttpFetcher::new(StdDuration::from_millis(100), "test").unwrap();
        let result = fetcher.fetch(&mock_server.uri()).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn test_invalid_url_rejected() {
        let result = fetcher().fetch("not a url").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));

        let result = fetcher().fetch("ftp://example.com/file").await;
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_transient_classification() {
        assert!(FetchError::Timeout.is_transient());
        assert!(FetchError::Connect("refused".into()).is_transient());
        assert!(FetchError::HttpStatus(503).is_transient());
        assert!(FetchError::HttpStatus(429).is_transient());
        assert!(!FetchError::HttpStatus(404).is_transient());
        assert!(!FetchError::InvalidUrl("x".into()).is_transient());
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_errors() {
        let inner = ScriptedFetcher::new(vec![FetchError::Timeout, FetchError::HttpStatus(502)]);
        let retry = RetryFetch::new(inner, 2, StdDuration::from_millis(1));

        assert_eq!(retry.fetch("https://example.com").await.unwrap(), "ok");
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let inner = ScriptedFetcher::new((0..5).map(|_| FetchError::Timeout).collect());
        let retry = RetryFetch::new(inner, 1, StdDuration::from_millis(1));

        assert!(matches!(
            retry.fetch("https://example.com").await,
            Err(FetchError::Timeout)
        ));
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_skips_permanent_errors() {
        let inner = ScriptedFetcher::new(vec![FetchError::HttpStatus(404)]);
        let retry = RetryFetch::new(inner, 3, StdDuration::from_millis(1));

        assert!(matches!(
            retry.fetch("https://example.com").await,
            Err(FetchError::HttpStatus(404))
        ));
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 1);
    }
}
