//! Combined digest: every article of a run in one text file.
//!
//! Articles appear in feed order, each introduced by a numbered separator:
//!
//! ```text
//! --- Article 1 ---
//! <title>
//! <url>
//!
//! <body>
//!
//! --- Article 2 ---
//! ...
//! ```

use crate::models::ArticleRecord;
use crate::outputs::text::render_article;
use std::error::Error;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// Render the digest for `records`, which must already be in feed order.
pub fn render_digest(records: &[ArticleRecord]) -> String {
    let mut out = String::new();
    for (n, record) in records.iter().enumerate() {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "--- Article {} ---\n{}\n\n",
            n + 1,
            render_article(&record.article_ref, &record.article)
        );
    }
    out
}

/// Write the digest for `records` to `path`, replacing any previous file.
#[instrument(level = "info", skip(records))]
pub async fn write_digest(path: &str, records: &[ArticleRecord]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, render_digest(records)).await?;
    info!(articles = records.len(), "Wrote combined digest");
    Ok(())
}
