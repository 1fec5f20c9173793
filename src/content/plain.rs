//! Plain text content provider
//!
//! Invalid UTF-8 sequences are replaced rather than rejected so a single bad
//! byte does not turn a comparable document into an `ERROR` row.

use super::checksum::{sha256_file, Digest};
use super::ContentProvider;
use crate::error::{DocumentError, DocumentResult};
use std::path::Path;

/// Digest via SHA-256, text read straight from the file
#[derive(Debug, Clone, Copy, Default)]
pub struct TextContentProvider;

impl ContentProvider for TextContentProvider {
    fn digest(&self, path: &Path) -> DocumentResult<Digest> {
        sha256_file(path)
    }

    fn extract_text(&self, path: &Path) -> DocumentResult<String> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    fn name(&self) -> &'static str {
        "text"
    }
}
