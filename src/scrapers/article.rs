//! Article page extraction.
//!
//! [`ArticleExtractor`] never propagates an error: a page that cannot be
//! fetched becomes [`Extraction::Failed`], and a page whose markup does not
//! match the selectors still yields an article whose body carries one of the
//! "not found" placeholders. One bad URL therefore never aborts a batch.
//!
//! The two placeholders are deliberately different:
//! - [`NO_CONTENT`]: the body container is missing (the site layout changed
//!   or the selector broke)
//! - [`NO_TEXT`]: the container exists but holds no visible prose

use crate::http::FetchPage;
use crate::models::{
    ExtractedArticle, Extraction, ExtractionFailure, NO_CONTENT, NO_TEXT, NO_TITLE,
};
use crate::scrapers::ArticleSelectors;
use scraper::Html;
use tracing::{debug, instrument, warn};

/// Fetches article pages and extracts headline and body text from them.
#[derive(Debug)]
pub struct ArticleExtractor<'a, F, S> {
    fetcher: &'a F,
    selectors: S,
}

impl<'a, F, S> ArticleExtractor<'a, F, S>
where
    F: FetchPage,
    S: ArticleSelectors,
{
    pub fn new(fetcher: &'a F, selectors: S) -> Self {
        Self { fetcher, selectors }
    }

    /// Fetch and extract a single article.
    ///
    /// Stateless: extracting the same unchanged page twice gives the same result.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, url: &str) -> Extraction {
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let article = extract_from_html(url, &html, &self.selectors);
                debug!(bytes = article.body.len(), title = %article.title, "Parsed article");
                Extraction::Extracted(article)
            }
            Err(reason) => {
                warn!(error = %reason, "Article fetch failed");
                Extraction::Failed(ExtractionFailure {
                    url: url.to_string(),
                    title: NO_TITLE.to_string(),
                    reason,
                })
            }
        }
    }

    /// Like [`extract`](Self::extract), with any failure folded into the body text.
    pub async fn extract_article(&self, url: &str) -> ExtractedArticle {
        self.extract(url).await.into_article()
    }
}

/// Build an [`ExtractedArticle`] from an already downloaded page.
///
/// The body is `"{title}\n\n{content}"`, where content falls back to
/// [`NO_CONTENT`] or [`NO_TEXT`] as described in the module docs.
pub fn extract_from_html<S: ArticleSelectors>(
    url: &str,
    html: &str,
    selectors: &S,
) -> ExtractedArticle {
    let document = Html::parse_document(html);

    let title = selectors
        .select_headline(&document)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let content = match selectors.select_body(&document) {
        None => NO_CONTENT.to_string(),
        Some(text) if text.trim().is_empty() => NO_TEXT.to_string(),
        Some(text) => text.trim().to_string(),
    };

    ExtractedArticle {
        body: format!("{title}\n\n{content}"),
        title,
        url: url.to_string(),
    }
}
