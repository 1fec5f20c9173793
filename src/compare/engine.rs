//! Per-document classification
//!
//! Each old document runs through a short-circuit sequence:
//!
//! ```text
//!   key? ──no──▶ SKIPPED
//!    │
//!   in index? ──no──▶ MISSING_NEW
//!    │
//!   digests equal? ──yes──▶ IDENTICAL_BINARY
//!    │
//!   canonical texts equal? ──yes──▶ IDENTICAL_TEXT
//!    │
//!    └──▶ TEXT_CHANGED (reason = bounded token diff)
//! ```
//!
//! Failures anywhere after the lookup, including panics inside a content
//! provider, are caught here and turned into an `ERROR` outcome. Nothing
//! escapes `compare`, so one broken document cannot affect another.

use crate::compare::outcome::CompareOutcome;
use crate::content::checksum::to_hex;
use crate::content::ContentProvider;
use crate::error::{DocumentError, DocumentResult};
use crate::index::{DocumentIndex, DocumentRef};
use crate::keys::FilenameKeyExtractor;
use crate::text::{diff_tokens, normalize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Tokens listed per diff segment
pub const MAX_DIFF_ITEMS: usize = 10;

/// Classifies old documents against the NEW index
pub struct CompareEngine {
    extractor: FilenameKeyExtractor,
    index: Arc<DocumentIndex>,
    content: Arc<dyn ContentProvider>,
    max_diff_items: usize,
}

impl CompareEngine {
    /// Create an engine over a built index
    pub fn new(
        extractor: FilenameKeyExtractor,
        index: Arc<DocumentIndex>,
        content: Arc<dyn ContentProvider>,
    ) -> Self {
        Self {
            extractor,
            index,
            content,
            max_diff_items: MAX_DIFF_ITEMS,
        }
    }

    /// Override the number of tokens listed per diff segment
    pub fn with_max_diff_items(mut self, max_diff_items: usize) -> Self {
        self.max_diff_items = max_diff_items;
        self
    }

    /// Classify one old document. Never fails.
    pub fn compare(&self, old_path: &Path) -> CompareOutcome {
        let Some(key) = self.extractor.extract_path(old_path) else {
            return CompareOutcome::skipped(file_name(old_path));
        };

        let Some(new_doc) = self.index.get(&key) else {
            return CompareOutcome::missing_new(key);
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.compare_content(&key, old_path, new_doc)
        }));

        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                debug!(key = %key, error = %e, "Document failed");
                CompareOutcome::error(key, e.to_string())
            }
            Err(payload) => {
                let e = DocumentError::Panicked {
                    path: old_path.to_path_buf(),
                    message: panic_message(payload.as_ref()),
                };
                debug!(key = %key, error = %e, "Document processing panicked");
                CompareOutcome::error(key, e.to_string())
            }
        }
    }

    /// Steps 3 to 5: digest, canonical text, token diff
    fn compare_content(
        &self,
        key: &str,
        old_path: &Path,
        new_doc: &DocumentRef,
    ) -> DocumentResult<CompareOutcome> {
        let old_digest = self.content.digest(old_path)?;
        let new_digest = self.content.digest(&new_doc.path)?;

        if old_digest == new_digest {
            trace!(key = key, digest = %to_hex(&old_digest), "Digests match");
            return Ok(CompareOutcome::identical_binary(key));
        }

        let old_text = normalize(&self.content.extract_text(old_path)?);
        let new_text = normalize(&self.content.extract_text(&new_doc.path)?);

        if old_text == new_text {
            trace!(key = key, "Canonical texts match");
            return Ok(CompareOutcome::identical_text(key));
        }

        let diff = diff_tokens(&old_text, &new_text, self.max_diff_items);
        Ok(CompareOutcome::text_changed(key, diff))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
