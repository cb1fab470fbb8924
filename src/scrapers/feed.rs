//! RSS feed reader.
//!
//! The feeds this scraper targets do not carry the article URL in a usable
//! `<link>` element. Instead each `<description>` embeds an XML-escaped HTML
//! anchor (`&lt;a href="..."&gt;`) or a CDATA block containing one, so the URL
//! is recovered with a single pattern search over the description text.

use crate::http::{FetchError, FetchPage};
use crate::models::{ArticleRef, FeedItem};
use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use tracing::{debug, info, instrument, warn};
use url::Url;

static HREF_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="([^"]+)""#).expect("href pattern is valid"));

/// Fetch `feed_url` and return the articles it links to, in feed order.
///
/// Network failures and non-2xx responses are returned as errors; a feed
/// that parses to zero items is an empty list, not an error.
#[instrument(level = "info", skip(fetcher))]
pub async fn fetch_feed<F: FetchPage>(
    fetcher: &F,
    feed_url: &str,
) -> Result<Vec<ArticleRef>, FetchError> {
    let xml = fetcher.fetch(feed_url).await?;
    let items = parse_feed(&xml);
    let refs = article_refs(&items);

    info!(
        items = items.len(),
        articles = refs.len(),
        source = feed_url,
        "Indexed feed article URLs"
    );
    debug!(urls = ?refs.iter().map(|r| r.url.as_str()).collect::<Vec<_>>(), "Feed URLs");
    Ok(refs)
}

/// Turn parsed feed items into [`ArticleRef`]s, skipping items without a link.
///
/// The href is stored exactly as it appears in the description; see
/// [`fetch_url`] for turning a relative one into something fetchable.
pub fn article_refs(items: &[FeedItem]) -> Vec<ArticleRef> {
    items
        .iter()
        .filter_map(|item| {
            let Some(href) = extract_href(&item.description_html) else {
                debug!(title = %item.title, "Feed item has no href; skipping");
                return None;
            };
            Some(ArticleRef {
                title: item.title.clone(),
                url: href.to_string(),
            })
        })
        .collect()
}

/// First `href="..."` value found anywhere in `description`.
pub fn extract_href(description: &str) -> Option<&str> {
    HREF_PATTERN
        .captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// URL to request for an article href found in the feed at `feed_url`.
///
/// Absolute hrefs come back unchanged; relative ones are joined onto the feed
/// URL. Anything that cannot be joined is returned as-is and left for the
/// fetcher to reject.
pub fn fetch_url(feed_url: &str, href: &str) -> String {
    match Url::parse(href) {
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(feed_url)
            .and_then(|base| base.join(href))
            .map(|u| u.to_string())
            .unwrap_or_else(|_| href.to_string()),
        _ => href.to_string(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
}

/// Parse every `<item>` of an RSS document.
///
/// Only direct `<title>` and `<description>` children of an item are read,
/// so namespaced elements such as `<media:title>` never overwrite them.
/// Parsing stops at the first XML error; items completed before it are kept.
pub fn parse_feed(xml: &str) -> Vec<FeedItem> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut has_description = false;
    // Element depth relative to the open <item>: 1 = direct child.
    let mut depth = 0usize;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.name();
                if current.is_none() {
                    if name.as_ref() == b"item" {
                        current = Some(FeedItem::default());
                        has_description = false;
                        depth = 0;
                    }
                    continue;
                }
                depth += 1;
                if depth == 1 {
                    field = match name.as_ref() {
                        b"title" => Some(Field::Title),
                        b"description" => {
                            has_description = true;
                            Some(Field::Description)
                        }
                        _ => None,
                    };
                }
            }
            Ok(Event::End(e)) => {
                if current.is_none() {
                    continue;
                }
                if depth == 0 && e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        if has_description {
                            items.push(item);
                        } else {
                            debug!(title = %item.title, "Feed item has no description; skipping");
                        }
                    }
                    field = None;
                    continue;
                }
                if depth == 1 {
                    field = None;
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    push_field(item, f, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if let (Some(item), Some(f)) = (current.as_mut(), field) {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    push_field(item, f, &text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    parsed = items.len(),
                    "Malformed feed XML; keeping items parsed so far"
                );
                break;
            }
            _ => {}
        }
    }

    items
}

fn push_field(item: &mut FeedItem, field: Field, text: &str) {
    let target = match field {
        Field::Title => &mut item.title,
        Field::Description => &mut item.description_html,
    };
    target.push_str(text);
}
