//! Data models for feed entries, discovered articles, and extraction results.
//!
//! This module defines the core data structures that flow through the pipeline:
//! - [`FeedItem`]: One `<item>` parsed out of the RSS document
//! - [`ArticleRef`]: A discovered article (feed title + page URL)
//! - [`ExtractedArticle`]: Headline and body text recovered from an article page
//! - [`Extraction`]: Outcome of one extraction, either an article or a tagged failure
//! - [`ArticleRecord`]: Everything persistence needs to write one article

use crate::http::FetchError;

/// Headline placeholder used when the page has no matching headline element.
pub const NO_TITLE: &str = "No title found";
/// Body placeholder used when the page has no matching content container.
pub const NO_CONTENT: &str = "No article content found.";
/// Body placeholder used when the content container holds no visible text.
pub const NO_TEXT: &str = "No article text found.";
/// Prefix of the body written for articles that could not be fetched.
pub const FAILURE_PREFIX: &str = "Failed to retrieve article: ";

/// One entry of the feed document.
///
/// Ephemeral: produced by the feed parser and consumed immediately to derive
/// an [`ArticleRef`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedItem {
    /// Text of the item's `<title>`, empty when the item has none.
    pub title: String,
    /// Unescaped text of the item's `<description>`, which embeds an HTML anchor.
    pub description_html: String,
}

/// A discoverable article: the feed's title for it and the page URL.
///
/// `url` is never empty. `title` is not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRef {
    pub title: String,
    pub url: String,
}

/// Headline and body text recovered from one article page.
///
/// `body` always starts with the page headline (or [`NO_TITLE`]) followed by
/// a blank line, except for fetch failures where it is
/// `"Failed to retrieve article: <reason>"`. It is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub title: String,
    pub url: String,
    pub body: String,
}

/// An article page that could not be fetched.
#[derive(Debug)]
pub struct ExtractionFailure {
    pub url: String,
    /// Whatever headline was recoverable; always [`NO_TITLE`] for fetch errors.
    pub title: String,
    pub reason: FetchError,
}

/// Outcome of extracting one article.
///
/// Callers have to decide what to do with a failure; use
/// [`Extraction::into_article`] to fold it into the readable text form.
#[must_use]
#[derive(Debug)]
pub enum Extraction {
    Extracted(ExtractedArticle),
    Failed(ExtractionFailure),
}

impl Extraction {
    /// `true` when the page was fetched, whatever its selectors matched.
    pub fn is_extracted(&self) -> bool {
        matches!(self, Extraction::Extracted(_))
    }

    /// Human-readable failure reason, if any.
    pub fn failure_reason(&self) -> Option<String> {
        match self {
            Extraction::Extracted(_) => None,
            Extraction::Failed(failure) => Some(failure.reason.to_string()),
        }
    }

    /// Convert into an [`ExtractedArticle`], embedding any failure in the body.
    pub fn into_article(self) -> ExtractedArticle {
        match self {
            Extraction::Extracted(article) => article,
            Extraction::Failed(failure) => ExtractedArticle {
                body: format!("{FAILURE_PREFIX}{}", failure.reason),
                title: failure.title,
                url: failure.url,
            },
        }
    }
}

/// One article ready to be persisted.
#[derive(Debug, Clone)]
pub struct ArticleRecord {
    /// Zero-based position of the article in the feed.
    pub index: usize,
    pub article_ref: ArticleRef,
    /// File name (with extension) allocated for this article.
    pub file_name: String,
    pub article: ExtractedArticle,
    /// Failure reason when the page could not be fetched.
    pub failure: Option<String>,
}
