//! Pipeline driver: feed → articles → files.
//!
//! 1. **Indexing**: read the feed once; a failure here ends the run
//! 2. **Planning**: drop duplicate URLs and allocate file names in feed order
//! 3. **Fetching**: extract every article, `concurrency` pages at a time
//! 4. **Output**: write each article as soon as it is extracted, then the
//!    optional digest and manifest
//!
//! Every discovered URL produces exactly one output file, whatever happens to
//! its page.

use crate::config::ScraperConfig;
use crate::http::FetchPage;
use crate::models::{ArticleRecord, ArticleRef};
use crate::outputs::{digest, json, text};
use crate::scrapers::CssSelectors;
use crate::scrapers::article::ArticleExtractor;
use crate::scrapers::feed;
use crate::utils::{ensure_writable_dir, truncate_for_log};
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};

/// Counters describing one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique article URLs found in the feed.
    pub discovered: usize,
    /// Pages fetched successfully (selectors may still have matched nothing).
    pub extracted: usize,
    /// Pages that could not be fetched.
    pub failed: usize,
    /// Article files written.
    pub written: usize,
    /// Article files that could not be written.
    pub write_errors: usize,
}

/// Run the whole pipeline once.
///
/// # Errors
///
/// Returns an error when the selectors are invalid, the output directory is
/// not writable, or the feed itself cannot be fetched. Per-article problems
/// are never returned; they end up in the article files.
#[instrument(level = "info", skip_all, fields(feed_url = %config.feed_url))]
pub async fn run<F: FetchPage>(
    config: &ScraperConfig,
    fetcher: &F,
) -> Result<RunSummary, Box<dyn Error>> {
    let selectors = CssSelectors::from_config(&config.selectors)?;
    let output_dir = Path::new(&config.output_dir);
    if let Err(e) = ensure_writable_dir(output_dir).await {
        error!(
            path = %output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Indexing ----
    let refs = feed::fetch_feed(fetcher, &config.feed_url).await?;
    let found = refs.len();
    let refs: Vec<ArticleRef> = refs.into_iter().unique_by(|r| r.url.clone()).collect();
    if refs.len() < found {
        info!(duplicates = found - refs.len(), "Dropped duplicate article URLs");
    }

    // ---- Planning ----
    let mut allocator = text::FileNameAllocator::new();
    let planned: Vec<(usize, ArticleRef, String)> = refs
        .into_iter()
        .enumerate()
        .map(|(index, article_ref)| {
            let file_name = allocator.allocate(&article_ref);
            (index, article_ref, file_name)
        })
        .collect();
    let total = planned.len();
    let feed_url = config.feed_url.as_str();

    // ---- Fetching + per-article output ----
    let extractor = ArticleExtractor::new(fetcher, selectors);
    info!(total, concurrency = config.concurrency, "Starting article extraction");

    let results: Vec<(ArticleRecord, bool)> = stream::iter(planned)
        .map(|(index, article_ref, file_name)| {
            let extractor = &extractor;
            async move {
                info!(
                    n = index + 1,
                    total,
                    title = %article_ref.title,
                    url = %article_ref.url,
                    "Scraping article"
                );
                let page_url = feed::fetch_url(feed_url, &article_ref.url);
                let extraction = extractor.extract(&page_url).await;
                let failure = extraction.failure_reason();
                let article = extraction.into_article();
                debug!(
                    index,
                    preview = %truncate_for_log(&article.body, 120),
                    "Extracted article"
                );

                let record = ArticleRecord {
                    index,
                    article_ref,
                    file_name,
                    article,
                    failure,
                };
                let written = match text::write_article(output_dir, &record).await {
                    Ok(_) => true,
                    Err(e) => {
                        error!(file = %record.file_name, error = %e, "Failed writing article file");
                        false
                    }
                };
                (record, written)
            }
        })
        .buffer_unordered(config.concurrency)
        .collect()
        .await;

    let mut summary = RunSummary {
        discovered: total,
        ..RunSummary::default()
    };
    let mut records = Vec::with_capacity(results.len());
    for (record, written) in results {
        if record.failure.is_some() {
            summary.failed += 1;
        } else {
            summary.extracted += 1;
        }
        if written {
            summary.written += 1;
        } else {
            summary.write_errors += 1;
        }
        records.push(record);
    }
    records.sort_by_key(|r| r.index);

    // ---- Run-level outputs ----
    if let Some(path) = &config.combined_output {
        if let Err(e) = digest::write_digest(path, &records).await {
            error!(path = %path, error = %e, "Failed writing combined digest");
        }
    }

    if config.write_manifest {
        let manifest = json::RunManifest::from_records(&config.feed_url, &records);
        if let Err(e) = json::write_manifest(&manifest, output_dir).await {
            error!(error = %e, "Failed writing run manifest");
        }
    }

    if summary.failed > 0 {
        warn!(failed = summary.failed, total, "Some articles could not be fetched");
    }
    info!(
        discovered = summary.discovered,
        extracted = summary.extracted,
        failed = summary.failed,
        written = summary.written,
        write_errors = summary.write_errors,
        "Completed article extraction"
    );

    Ok(summary)
}
