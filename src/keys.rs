//! Business key extraction from filenames
//!
//! Old and new documents are paired by a key cut out of the file stem.
//! The cut is configured as a mode plus character bounds:
//!
//! - `prefix`: `[0, end)`
//! - `range`:  `[start, end)`
//! - `suffix`: `[start, len)`
//!
//! Bounds count Unicode scalar values, not bytes. A file that cannot be keyed
//! yields `None`; that is never an error.

use std::fmt;
use std::path::Path;

/// Which part of the file stem forms the business key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum KeyMode {
    /// From the beginning of the stem up to `end`
    #[default]
    Prefix,
    /// From `start` up to `end`
    Range,
    /// From `start` to the end of the stem
    Suffix,
}

impl KeyMode {
    /// Name used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyMode::Prefix => "prefix",
            KeyMode::Range => "range",
            KeyMode::Suffix => "suffix",
        }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracts business keys from filenames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameKeyExtractor {
    mode: KeyMode,
    start: Option<usize>,
    end: Option<usize>,
}

impl FilenameKeyExtractor {
    /// Create an extractor with explicit (possibly unset) bounds
    pub fn new(mode: KeyMode, start: Option<usize>, end: Option<usize>) -> Self {
        Self { mode, start, end }
    }

    /// Key is the first `end` characters of the stem
    pub fn prefix(end: usize) -> Self {
        Self::new(KeyMode::Prefix, None, Some(end))
    }

    /// Key is characters `[start, end)` of the stem
    pub fn range(start: usize, end: usize) -> Self {
        Self::new(KeyMode::Range, Some(start), Some(end))
    }

    /// Key is everything from `start` on
    pub fn suffix(start: usize) -> Self {
        Self::new(KeyMode::Suffix, Some(start), None)
    }

    /// Extract the key from a bare filename (extension included)
    pub fn extract(&self, filename: &str) -> Option<String> {
        let stem = strip_extension(filename);
        let chars: Vec<char> = stem.chars().collect();
        let len = chars.len();

        let (start, end) = match self.mode {
            KeyMode::Prefix => (0, self.end?),
            KeyMode::Range => (self.start?, self.end?),
            KeyMode::Suffix => (self.start?, len),
        };

        if end > len || start >= end {
            return None;
        }

        Some(chars[start..end].iter().collect())
    }

    /// Extract the key from the final component of a path
    pub fn extract_path(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        self.extract(name)
    }
}

/// Drop everything from the last dot on, unless the dot leads the name
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
