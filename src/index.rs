//! Business key index over the NEW document set
//!
//! Built once, before any comparison starts, and then shared read-only by
//! every worker. A duplicate key makes joins ambiguous, so construction
//! fails on the first collision and the run is aborted.

use crate::error::IndexError;
use crate::keys::FilenameKeyExtractor;
use std::collections::hash_map::{Entry, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// A discovered document and its business key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    pub path: PathBuf,
    pub key: String,
}

/// Read-only mapping from business key to NEW document
#[derive(Debug, Default)]
pub struct DocumentIndex {
    entries: HashMap<String, DocumentRef>,

    /// Files that could not be keyed and were left out
    unkeyed: usize,
}

impl DocumentIndex {
    /// Build the index from NEW document paths
    ///
    /// Paths whose key cannot be extracted are skipped. The first duplicate
    /// key aborts the build.
    pub fn build<I>(paths: I, extractor: &FilenameKeyExtractor) -> Result<Self, IndexError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut entries = HashMap::new();
        let mut unkeyed = 0;

        for path in paths {
            let Some(key) = extractor.extract_path(&path) else {
                debug!(path = %path.display(), "No filename key, excluded from index");
                unkeyed += 1;
                continue;
            };

            match entries.entry(key) {
                Entry::Occupied(existing) => {
                    let existing: &DocumentRef = existing.get();
                    return Err(IndexError::DuplicateKey {
                        key: existing.key.clone(),
                        first: existing.path.clone(),
                        second: path,
                    });
                }
                Entry::Vacant(slot) => {
                    let key = slot.key().clone();
                    slot.insert(DocumentRef { path, key });
                }
            }
        }

        Ok(Self { entries, unkeyed })
    }

    /// Look up the NEW document for a key
    pub fn get(&self, key: &str) -> Option<&DocumentRef> {
        self.entries.get(key)
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of files excluded because no key could be extracted
    pub fn unkeyed(&self) -> usize {
        self.unkeyed
    }

    /// Indexed documents, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &DocumentRef> {
        self.entries.values()
    }
}
