//! Document content access
//!
//! The compare engine never touches document bytes directly; it asks a
//! [`ContentProvider`] for two capabilities:
//! - a fixed-length digest, equal for byte-identical files
//! - the raw extracted text, in whatever order the extractor produces it
//!
//! Providers are shared by every worker thread, so they must be
//! `Send + Sync` and keep no per-document state.

pub mod checksum;
pub mod pdf;
pub mod plain;

use crate::error::DocumentResult;
use std::path::Path;

pub use checksum::{compute_sha256, sha256_file, Digest};
pub use pdf::PdfContentProvider;
pub use plain::TextContentProvider;

/// Digest and text extraction for one document format
pub trait ContentProvider: Send + Sync {
    /// Content digest of the file at `path`
    fn digest(&self, path: &Path) -> DocumentResult<Digest>;

    /// Raw (not yet normalized) text of the file at `path`
    fn extract_text(&self, path: &Path) -> DocumentResult<String>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Document formats with a built-in provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ContentKind {
    /// PDF documents, text extracted from the embedded text layer
    #[default]
    Pdf,
    /// UTF-8 text files
    Text,
}

impl ContentKind {
    /// Build the provider for this format
    pub fn provider(self) -> Box<dyn ContentProvider> {
        match self {
            ContentKind::Pdf => Box::new(PdfContentProvider),
            ContentKind::Text => Box::new(TextContentProvider),
        }
    }
}
