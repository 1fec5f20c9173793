//! Report output
//!
//! This module provides:
//! - `sink`: serialized CSV row writing with running counters
//! - `tally`: lock-free per-status counters
//! - `file`: partial-file lifecycle so only complete reports survive

pub mod file;
pub mod sink;
pub mod tally;

pub use file::ReportFile;
pub use sink::{ReportSink, REPORT_HEADER};
pub use tally::{RunningTally, TallySnapshot};
