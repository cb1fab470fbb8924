//! JSON run manifest.
//!
//! Written as `manifest.json` next to the article files so other tools can see
//! which file belongs to which URL and which pages failed, without parsing the
//! text files.
//!
//! ```json
//! {
//!   "generated_at": "2025-05-06T20:30:00+00:00",
//!   "feed_url": "https://example.com/rss.xml",
//!   "articles": [
//!     { "title": "...", "url": "...", "file": "....txt", "status": "extracted", "reason": null }
//!   ]
//! }
//! ```

use crate::models::ArticleRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    Extracted,
    Failed,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub title: String,
    pub url: String,
    pub file: String,
    pub status: ArticleStatus,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RunManifest {
    /// RFC 3339 UTC timestamp of when the manifest was written.
    pub generated_at: String,
    pub feed_url: String,
    pub articles: Vec<ManifestEntry>,
}

impl RunManifest {
    /// Build a manifest from records in feed order.
    pub fn from_records(feed_url: &str, records: &[ArticleRecord]) -> Self {
        let articles = records
            .iter()
            .map(|record| ManifestEntry {
                title: record.article_ref.title.clone(),
                url: record.article_ref.url.clone(),
                file: record.file_name.clone(),
                status: if record.failure.is_some() {
                    ArticleStatus::Failed
                } else {
                    ArticleStatus::Extracted
                },
                reason: record.failure.clone(),
            })
            .collect();

        Self {
            generated_at: Utc::now().to_rfc3339(),
            feed_url: feed_url.to_string(),
            articles,
        }
    }
}

/// Write `manifest` as pretty-printed JSON into `output_dir`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_manifest(manifest: &RunManifest, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(manifest)?;
    let path = output_dir.join(MANIFEST_FILE);
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = manifest.articles.len(), "Wrote run manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRef, ExtractedArticle};

    fn record(failure: Option<&str>) -> ArticleRecord {
        ArticleRecord {
            index: 0,
            article_ref: ArticleRef {
                title: "Title".to_string(),
                url: "https://x.example/1".to_string(),
            },
            file_name: "Title.txt".to_string(),
            article: ExtractedArticle {
                title: "Title".to_string(),
                url: "https://x.example/1".to_string(),
                body: "Title\n\nText".to_string(),
            },
            failure: failure.map(str::to_string),
        }
    }

    #[test]
    fn test_manifest_status_serialization() {
        let manifest = RunManifest::from_records(
            "https://x.example/rss",
            &[record(None), record(Some("Request timed out"))],
        );

        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains(r#""status":"extracted""#));
        assert!(json.contains(r#""status":"failed""#));
        assert!(json.contains(r#""reason":"Request timed out""#));
    }

    #[tokio::test]
    async fn test_write_manifest_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = RunManifest::from_records("https://x.example/rss", &[record(None)]);

        write_manifest(&manifest, dir.path()).await.unwrap();

        let text = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
        let parsed: RunManifest = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.feed_url, "https://x.example/rss");
        assert_eq!(parsed.articles.len(), 1);
        assert_eq!(parsed.articles[0].status, ArticleStatus::Extracted);
        assert_eq!(parsed.articles[0].file, "Title.txt");
    }
}
