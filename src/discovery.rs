//! Document enumeration
//!
//! Walks a directory tree and yields every regular file carrying the
//! configured extension. Entries are visited in file-name order so two runs
//! over the same tree submit documents in the same sequence. Symlinks that
//! resolve to regular files count as documents; symlinked directories are
//! not descended into.
//!
//! Any error while walking is fatal for the run: a report built from a
//! partially enumerated tree would silently under-count documents.

use crate::error::DiscoveryError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lazily walks a tree, yielding matching document paths
pub struct DocumentWalker {
    root: PathBuf,
    extension: String,
    inner: walkdir::IntoIter,
}

impl DocumentWalker {
    /// Walk `root` for files whose extension equals `extension`
    /// (ASCII case-insensitive, without the leading dot)
    pub fn new(root: &Path, extension: &str) -> Self {
        let inner = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        Self {
            root: root.to_path_buf(),
            extension: extension.trim_start_matches('.').to_string(),
            inner,
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl Iterator for DocumentWalker {
    type Item = Result<PathBuf, DiscoveryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    return Some(Err(DiscoveryError::Walk {
                        root: self.root.clone(),
                        reason: e.to_string(),
                    }))
                }
            };

            if is_document(&entry) && self.matches(entry.path()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}

/// Regular file, or a symlink whose target is one
fn is_document(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

/// Collect every matching document under `root`
pub fn discover_documents(root: &Path, extension: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    DocumentWalker::new(root, extension).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discovers_nested_matching_files() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        fs::write(dir.path().join("top.pdf"), b"x").unwrap();
        fs::write(dir.path().join("a/b/deep.PDF"), b"x").unwrap();
        fs::write(dir.path().join("a/notes.txt"), b"x").unwrap();

        let found = discover_documents(dir.path(), "pdf").unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(found.len(), 2);
        assert!(names.contains(&"top.pdf".to_string()));
        assert!(names.contains(&"deep.PDF".to_string()));
    }

    #[test]
    fn test_leading_dot_in_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.txt"), b"x").unwrap();

        assert_eq!(discover_documents(dir.path(), ".txt").unwrap().len(), 1);
    }

    #[test]
    fn test_directories_named_like_documents_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        assert!(discover_documents(dir.path(), "pdf").unwrap().is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let result = discover_documents(&missing, "pdf");
        assert!(matches!(result, Err(DiscoveryError::Walk { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_documents() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let target = dir.path().join("target");
        fs::create_dir_all(target.join("inner")).unwrap();
        fs::write(target.join("real.pdf"), b"x").unwrap();
        fs::write(target.join("inner/hidden.pdf"), b"x").unwrap();

        let root = dir.path().join("root");
        fs::create_dir(&root).unwrap();
        symlink(target.join("real.pdf"), root.join("link.pdf")).unwrap();
        symlink(target.join("inner"), root.join("linked_dir")).unwrap();
        symlink(target.join("missing.pdf"), root.join("dangling.pdf")).unwrap();

        let found = discover_documents(&root, "pdf").unwrap();
        assert_eq!(found, vec![root.join("link.pdf")]);
    }

    #[test]
    fn test_order_is_stable() {
        let dir = tempdir().unwrap();
        for name in ["c.pdf", "a.pdf", "b.pdf"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }

        let first = discover_documents(dir.path(), "pdf").unwrap();
        let second = discover_documents(dir.path(), "pdf").unwrap();
        assert_eq!(first, second);
        assert!(first[0].ends_with("a.pdf"));
    }
}
