//! One text file per article.
//!
//! File names come from the feed title with characters that are invalid on
//! common filesystems removed and the length capped at 100 characters, or
//! fewer when multi-byte text would push the name past 255 bytes. A title
//! that sanitizes to nothing falls back to the MD5 digest of the article URL.
//!
//! ```text
//! output_dir/
//! ├── Monsoon arrives early in Kerala.txt
//! └── 0cc175b9c0f1b6a831c399e269772661.txt
//! ```

use crate::models::{ArticleRecord, ArticleRef, ExtractedArticle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

/// Maximum length of a file stem, in characters.
pub const MAX_STEM_CHARS: usize = 100;

/// Maximum length of a file stem, in bytes, so that `<stem>.txt` fits the
/// 255-byte name limit of ext4, APFS and friends.
pub const MAX_STEM_BYTES: usize = 255 - ".txt".len();

/// `-` plus eight hex digits appended on a name collision.
const COLLISION_SUFFIX_LEN: usize = 9;

static INVALID_FILENAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/*?:"<>|\x00-\x1f\x7f]"#).expect("filename pattern is valid")
});

/// Strip characters that are invalid in file names and cap the length.
pub fn sanitize_filename(title: &str) -> String {
    let cleaned = INVALID_FILENAME_CHARS.replace_all(title, "");
    cap_stem(cleaned.trim(), MAX_STEM_CHARS, MAX_STEM_BYTES)
}

/// Longest prefix of `stem` within both limits, cut on a char boundary.
fn cap_stem(stem: &str, max_chars: usize, max_bytes: usize) -> String {
    let end = stem
        .char_indices()
        .take(max_chars)
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    stem[..end].trim_end().to_string()
}

/// Lowercase hex MD5 digest of `url`.
pub fn url_digest(url: &str) -> String {
    format!("{:x}", md5::compute(url.as_bytes()))
}

/// File stem for an article: the sanitized title, or the URL digest when empty.
pub fn article_file_stem(title: &str, url: &str) -> String {
    let stem = sanitize_filename(title);
    if stem.is_empty() {
        url_digest(url)
    } else {
        stem
    }
}

/// Hands out file names in feed order so that output names never depend on
/// the order in which extractions finish.
///
/// A stem already taken by an earlier article is shortened to make room and
/// gets `-<first 8 hex of md5(url)>` appended, so the result stays within the
/// same length limits as any other name.
#[derive(Debug, Default)]
pub struct FileNameAllocator {
    taken: HashSet<String>,
}

impl FileNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a `.txt` file name for `article`.
    pub fn allocate(&mut self, article: &ArticleRef) -> String {
        let stem = article_file_stem(&article.title, &article.url);
        let stem = if self.taken.contains(&stem.to_lowercase()) {
            let base = cap_stem(
                &stem,
                MAX_STEM_CHARS - COLLISION_SUFFIX_LEN,
                MAX_STEM_BYTES - COLLISION_SUFFIX_LEN,
            );
            let suffixed = format!("{base}-{}", &url_digest(&article.url)[..8]);
            debug!(original = %stem, renamed = %suffixed, "File name collision");
            suffixed
        } else {
            stem
        };
        self.taken.insert(stem.to_lowercase());
        format!("{stem}.txt")
    }
}

/// File contents: feed title, URL, a blank line, then the extracted body.
pub fn render_article(article_ref: &ArticleRef, article: &ExtractedArticle) -> String {
    format!("{}\n{}\n\n{}", article_ref.title, article_ref.url, article.body)
}

/// Write one article record into `output_dir`.
#[instrument(level = "debug", skip_all, fields(file = %record.file_name))]
pub async fn write_article(
    output_dir: &Path,
    record: &ArticleRecord,
) -> Result<PathBuf, Box<dyn Error>> {
    let path = output_dir.join(&record.file_name);
    fs::write(&path, render_article(&record.article_ref, &record.article)).await?;
    debug!(path = %path.display(), "Wrote article file");
    Ok(path)
}
