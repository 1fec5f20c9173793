//! Classification results for a single old document

use std::fmt;

/// Reason recorded for `SKIPPED` outcomes
pub const REASON_NO_KEY: &str = "Cannot extract filename key";

/// Reason recorded for `MISSING_NEW` outcomes
pub const REASON_MISSING: &str = "No matching file in NEW set";

/// Reason recorded for `IDENTICAL_BINARY` outcomes
pub const REASON_EXACT: &str = "Exact match";

/// Reason recorded for `IDENTICAL_TEXT` outcomes
pub const REASON_TEXT_EQUAL: &str = "Text equal";

/// How an old document relates to its NEW counterpart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareStatus {
    /// Same bytes
    IdenticalBinary,
    /// Different bytes, same canonical text
    IdenticalText,
    /// Canonical text differs
    TextChanged,
    /// No NEW document carries the key
    MissingNew,
    /// No business key could be extracted
    Skipped,
    /// Reading, hashing or extraction failed
    Error,
}

impl CompareStatus {
    /// Every status, in report order
    pub const ALL: [CompareStatus; 6] = [
        CompareStatus::IdenticalBinary,
        CompareStatus::IdenticalText,
        CompareStatus::TextChanged,
        CompareStatus::MissingNew,
        CompareStatus::Skipped,
        CompareStatus::Error,
    ];

    /// Value written to the status column
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareStatus::IdenticalBinary => "IDENTICAL_BINARY",
            CompareStatus::IdenticalText => "IDENTICAL_TEXT",
            CompareStatus::TextChanged => "TEXT_CHANGED",
            CompareStatus::MissingNew => "MISSING_NEW",
            CompareStatus::Skipped => "SKIPPED",
            CompareStatus::Error => "ERROR",
        }
    }

    pub fn is_identical(&self) -> bool {
        matches!(self, CompareStatus::IdenticalBinary | CompareStatus::IdenticalText)
    }
}

impl fmt::Display for CompareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One report row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOutcome {
    /// Business key, or the file name when no key is available
    pub key: String,
    pub status: CompareStatus,
    pub reason: String,
}

impl CompareOutcome {
    pub fn new(key: impl Into<String>, status: CompareStatus, reason: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            status,
            reason: reason.into(),
        }
    }

    pub fn skipped(file_name: impl Into<String>) -> Self {
        Self::new(file_name, CompareStatus::Skipped, REASON_NO_KEY)
    }

    pub fn missing_new(key: impl Into<String>) -> Self {
        Self::new(key, CompareStatus::MissingNew, REASON_MISSING)
    }

    pub fn identical_binary(key: impl Into<String>) -> Self {
        Self::new(key, CompareStatus::IdenticalBinary, REASON_EXACT)
    }

    pub fn identical_text(key: impl Into<String>) -> Self {
        Self::new(key, CompareStatus::IdenticalText, REASON_TEXT_EQUAL)
    }

    pub fn text_changed(key: impl Into<String>, diff: impl Into<String>) -> Self {
        Self::new(key, CompareStatus::TextChanged, diff)
    }

    pub fn error(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(key, CompareStatus::Error, message)
    }

    /// Render as a CSV line (without line terminator)
    ///
    /// Commas in the reason become spaces; line breaks in either column
    /// become spaces so every outcome stays on one line. Nothing else is
    /// escaped.
    pub fn to_csv_row(&self) -> String {
        let key = strip_line_breaks(&self.key);
        let reason = strip_line_breaks(&self.reason).replace(',', " ");
        format!("{},{},{}", key, self.status, reason)
    }
}

fn strip_line_breaks(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}
