//! Output generation for scraped articles.
//!
//! # Submodules
//!
//! - [`text`]: One `.txt` file per article, plus file-name sanitization
//! - [`digest`]: Optional single file holding every article in feed order
//! - [`json`]: Optional `manifest.json` describing the run
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── <sanitized title>.txt   # one per article
//! ├── <md5 of url>.txt        # title sanitized to nothing
//! └── manifest.json           # --manifest
//!
//! <combined path>             # --combined, anywhere on disk
//! ```

pub mod digest;
pub mod json;
pub mod text;
