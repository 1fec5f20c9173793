//! Error types for doc-compare
//!
//! This module defines the error hierarchy for a comparison run:
//! - Configuration and CLI errors
//! - Document discovery and index construction errors (fatal)
//! - Report writing errors (fatal)
//! - Worker pool errors (fatal)
//! - Per-document errors, which are converted into `ERROR` report rows and
//!   never abort the run
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - Fatal errors propagate to `main`; per-document errors become data

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for a comparison run
#[derive(Error, Debug)]
pub enum CompareError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document enumeration errors
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Index construction errors
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Report sink errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Input root missing or not a directory
    #[error("Invalid {role} root '{path}': {reason}")]
    InvalidRoot {
        role: &'static str,
        path: PathBuf,
        reason: String,
    },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be at most {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid queue size
    #[error("Invalid queue size {size}: must be at least {min}")]
    InvalidQueueSize { size: usize, min: usize },

    /// Invalid progress log period
    #[error("Invalid log period {period}: must be at least 1")]
    InvalidLogPeriod { period: u64 },

    /// Key bounds missing or inconsistent for the selected mode
    #[error("Invalid filename key configuration for mode '{mode}': {reason}")]
    InvalidKeyBounds { mode: String, reason: String },

    /// Empty document extension
    #[error("Document extension must not be empty")]
    EmptyExtension,

    /// Invalid report name
    #[error("Invalid report name '{name}': {reason}")]
    InvalidReportName { name: String, reason: String },
}

/// Errors while enumerating a document tree
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// Walking the tree failed
    #[error("Failed to enumerate '{root}': {reason}")]
    Walk { root: PathBuf, reason: String },
}

/// Errors while building the document index
#[derive(Error, Debug)]
pub enum IndexError {
    /// Two documents in the NEW set map to the same business key
    #[error("Duplicate filename key '{key}' in NEW files: '{first}' and '{second}'")]
    DuplicateKey {
        key: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl IndexError {
    /// The business key that caused the failure
    pub fn key(&self) -> &str {
        match self {
            IndexError::DuplicateKey { key, .. } => key,
        }
    }
}

/// Report sink errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// Failed to create the report file or directory
    #[error("Failed to create report at '{path}': {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Writing a row failed
    #[error("Failed to write report row: {0}")]
    Write(#[source] std::io::Error),

    /// A previous write failed; the report can no longer be trusted
    #[error("Report sink is in a failed state after an earlier write error")]
    Poisoned,

    /// Finalizing (flush + rename) failed
    #[error("Failed to finalize report '{path}': {reason}")]
    FinalizeFailed { path: PathBuf, reason: String },
}

/// Worker pool errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Worker thread could not be spawned
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// All workers have exited; the queue no longer has receivers
    #[error("Failed to submit task: all workers have terminated")]
    QueueClosed,

    /// Workers did not finish within the drain timeout
    #[error("Workers did not drain within {}s", .timeout.as_secs())]
    DrainTimeout { timeout: Duration },

    /// A worker stopped because the report sink failed
    #[error("Worker {id} stopped: {source}")]
    Report { id: usize, source: ReportError },
}

/// Per-document errors
///
/// These are caught at the task boundary by the compare engine and recorded
/// as `ERROR` rows.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// Reading the document failed
    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Text extraction failed
    #[error("Text extraction failed for '{path}': {reason}")]
    Extraction { path: PathBuf, reason: String },

    /// A content provider panicked while handling the document
    #[error("Processing panicked for '{path}': {message}")]
    Panicked { path: PathBuf, message: String },
}

/// Result type alias for CompareError
pub type Result<T> = std::result::Result<T, CompareError>;

/// Result type alias for DocumentError
pub type DocumentResult<T> = std::result::Result<T, DocumentError>;

/// Result type alias for ReportError
pub type ReportResult<T> = std::result::Result<T, ReportError>;
