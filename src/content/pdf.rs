//! PDF content provider backed by pdf-extract
//!
//! Only digital PDFs with an embedded text layer yield text; scanned pages
//! come back empty and normalize to an empty string.

use super::checksum::{sha256_file, Digest};
use super::ContentProvider;
use crate::error::{DocumentError, DocumentResult};
use std::path::Path;

/// Digest via SHA-256, text via `pdf_extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfContentProvider;

impl ContentProvider for PdfContentProvider {
    fn digest(&self, path: &Path) -> DocumentResult<Digest> {
        sha256_file(path)
    }

    fn extract_text(&self, path: &Path) -> DocumentResult<String> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| DocumentError::Extraction {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "pdf"
    }
}
