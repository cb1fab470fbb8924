//! Feed discovery and article extraction.
//!
//! Scraping follows the same two-phase pattern for every source:
//!
//! 1. **Indexing**: [`feed::fetch_feed`] reads the RSS feed and returns the
//!    article URLs it links to, in feed order
//! 2. **Fetching**: [`article::ArticleExtractor`] downloads each page and pulls
//!    out the headline and the body text
//!
//! Which elements count as "headline" and "body" is site specific, so the
//! extractor asks an [`ArticleSelectors`] strategy instead of hard-coding
//! selectors. [`CssSelectors`] covers any site whose markup can be described
//! with two CSS selectors.

pub mod article;
pub mod feed;

use crate::config::{ConfigError, SelectorConfig, parse_selector};
use scraper::{ElementRef, Html, Selector};

/// Elements whose text is never visible on the rendered page.
const INVISIBLE_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Site-specific strategy for locating the headline and body of an article page.
pub trait ArticleSelectors {
    /// Text of the headline element, or `None` when the page has none.
    fn select_headline(&self, document: &Html) -> Option<String>;

    /// Visible text of the body container, one block per line.
    ///
    /// `None` means the container itself is missing; `Some("")` means it
    /// exists but holds no visible text.
    fn select_body(&self, document: &Html) -> Option<String>;
}

/// [`ArticleSelectors`] driven by two CSS selectors.
#[derive(Debug, Clone)]
pub struct CssSelectors {
    headline: Selector,
    body: Selector,
}

impl CssSelectors {
    pub fn new(headline: &str, body: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            headline: parse_selector(headline)?,
            body: parse_selector(body)?,
        })
    }

    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Self::new(&config.headline, &config.body)
    }
}

impl ArticleSelectors for CssSelectors {
    fn select_headline(&self, document: &Html) -> Option<String> {
        let element = document.select(&self.headline).next()?;
        let title = element
            .text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!title.is_empty()).then_some(title)
    }

    fn select_body(&self, document: &Html) -> Option<String> {
        document.select(&self.body).next().map(visible_text)
    }
}

/// Collect the visible text below `container`.
///
/// Every text node is trimmed, blank ones are dropped, and the rest are
/// joined with `\n`. Text inside `script`, `style`, `noscript` and
/// `template` elements is skipped.
pub fn visible_text(container: ElementRef<'_>) -> String {
    let root = *container;
    let root_id = root.id();
    root.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .ancestors()
                .take_while(|ancestor| ancestor.id() != root_id)
                .filter_map(|ancestor| ancestor.value().as_element())
                .any(|element| INVISIBLE_TAGS.contains(&element.name()));
            if hidden {
                return None;
            }
            let trimmed = text.trim();
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn selectors() -> CssSelectors {
        CssSelectors::new("h1.HNMDR", r#"div[data-articlebody="1"]"#).unwrap()
    }

    #[test]
    fn test_headline_found() {
        let doc = Html::parse_document(
            r#"<html><body><h1 class="HNMDR other">  Big <span>News</span> </h1></body></html>"#,
        );
        assert_eq!(selectors().select_headline(&doc).as_deref(), Some("Big News"));
    }

    #[test]
    fn test_headline_requires_class() {
        let doc = Html::parse_document("<html><body><h1>Plain</h1></body></html>");
        assert_eq!(selectors().select_headline(&doc), None);
    }

    #[test]
    fn test_blank_headline_counts_as_missing() {
        let doc = Html::parse_document(r#"<h1 class="HNMDR">   </h1>"#);
        assert_eq!(selectors().select_headline(&doc), None);
    }

    #[test]
    fn test_body_joins_blocks_with_newlines() {
        let doc = Html::parse_document(
            r#"<div data-articlebody="1">
                 <p>First paragraph.</p>
                 Loose text
                 <div><span>Nested</span> tail</div>
               </div>"#,
        );
        assert_eq!(
            selectors().select_body(&doc).as_deref(),
            Some("First paragraph.\nLoose text\nNested\ntail")
        );
    }

    #[test]
    fn test_body_skips_invisible_elements() {
        let doc = Html::parse_document(
            r#"<div data-articlebody="1"><script>var x = 1;</script><p>Shown</p><style>p{}</style></div>"#,
        );
        assert_eq!(selectors().select_body(&doc).as_deref(), Some("Shown"));
    }

    #[test]
    fn test_body_missing_vs_empty() {
        let missing = Html::parse_document("<div>no marker</div>");
        assert_eq!(selectors().select_body(&missing), None);

        let empty = Html::parse_document(r#"<div data-articlebody="1">  <p> </p> </div>"#);
        assert_eq!(selectors().select_body(&empty).as_deref(), Some(""));
    }

    #[test]
    fn test_other_attribute_value_does_not_match() {
        let doc = Html::parse_document(r#"<div data-articlebody="0"><p>Text</p></div>"#);
        assert_eq!(selectors().select_body(&doc), None);
    }
}
