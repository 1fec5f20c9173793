//! doc-compare - Parallel OLD/NEW document set comparison
//!
//! Pairs every document of an OLD tree with the document of a NEW tree that
//! carries the same business key (a substring of the file name) and records
//! one classification per OLD document in a CSV report.
//!
//! # Features
//!
//! - **Key-based pairing**: Business keys are cut out of file names by
//!   prefix, range or suffix. Duplicate keys in the NEW set abort the run
//!   before anything is compared.
//!
//! - **Layered comparison**: A content digest settles byte-identical pairs
//!   cheaply; only the rest pay for text extraction, normalization and a
//!   token diff.
//!
//! - **Bounded parallelism**: A fixed worker pool fed by a bounded queue.
//!   When the queue is full the submitting thread runs the task itself, so
//!   memory stays flat however large the OLD tree is.
//!
//! - **Trustworthy output**: Rows are serialized under a lock and the
//!   report only appears under its final name once every document has been
//!   recorded.
//!
//! # Architecture
//!
//! ```text
//!  NEW tree ──walk──▶ DocumentIndex (key ─▶ path, read-only, shared)
//!                              │
//!  OLD tree ──walk──▶ Coordinator ──try_submit──▶ Task Queue
//!                        │   (crossbeam bounded)        │
//!                        │ queue full:                  ▼
//!                        │ run inline       ┌─────────┐ ┌─────────┐
//!                        │                  │Worker 1 │ │Worker N │
//!                        ▼                  └────┬────┘ └────┬────┘
//!                  CompareEngine ◀───────────────┴───────────┘
//!                        │
//!                        ▼
//!               ┌──────────────────┐
//!               │   ReportSink     │
//!               │ - CSV rows       │
//!               │ - atomic tally   │
//!               └──────────────────┘
//!                        │
//!                        ▼
//!               report/comparison.csv
//! ```
//!
//! # Example
//!
//! ```bash
//! # Keys are the first 10 characters of each file name
//! doc-compare --old-root /data/old --new-root /data/new --key-end 10
//!
//! # Characters 4..12, eight workers, custom report location
//! doc-compare --old-root old --new-root new --key-mode range \
//!     --key-start 4 --key-end 12 -w 8 -o out --report-name diff.csv
//! ```

pub mod compare;
pub mod config;
pub mod content;
pub mod discovery;
pub mod error;
pub mod index;
pub mod keys;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod text;

pub use compare::{CompareEngine, CompareOutcome, CompareStatus};
pub use config::{CliArgs, CompareConfig};
pub use content::{ContentKind, ContentProvider, PdfContentProvider, TextContentProvider};
pub use error::{CompareError, Result};
pub use index::{DocumentIndex, DocumentRef};
pub use keys::{FilenameKeyExtractor, KeyMode};
pub use pipeline::{CompareCoordinator, CompareResult};
pub use report::{ReportSink, TallySnapshot};
