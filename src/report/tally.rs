//! Running per-status counters shared by all workers

use crate::compare::CompareStatus;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free outcome counters
#[derive(Debug, Default)]
pub struct RunningTally {
    /// Outcomes recorded
    pub processed: AtomicU64,

    /// IDENTICAL_BINARY + IDENTICAL_TEXT
    pub identical: AtomicU64,

    /// TEXT_CHANGED
    pub changed: AtomicU64,

    /// MISSING_NEW
    pub missing: AtomicU64,

    /// SKIPPED
    pub skipped: AtomicU64,

    /// ERROR
    pub errors: AtomicU64,
}

impl RunningTally {
    /// Count one outcome, returning the processed total including it
    pub fn record(&self, status: CompareStatus) -> u64 {
        let counter = match status {
            CompareStatus::IdenticalBinary | CompareStatus::IdenticalText => &self.identical,
            CompareStatus::TextChanged => &self.changed,
            CompareStatus::MissingNew => &self.missing,
            CompareStatus::Skipped => &self.skipped,
            CompareStatus::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.processed.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Point-in-time copy of the counters
    ///
    /// While workers are still running the fields may be read at slightly
    /// different moments; after the pool has drained the snapshot is exact.
    pub fn snapshot(&self) -> TallySnapshot {
        TallySnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            identical: self.identical.load(Ordering::Relaxed),
            changed: self.changed.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of the tally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallySnapshot {
    pub processed: u64,
    pub identical: u64,
    pub changed: u64,
    pub missing: u64,
    pub skipped: u64,
    pub errors: u64,
}

impl TallySnapshot {
    /// Sum of all per-status counters
    pub fn category_sum(&self) -> u64 {
        self.identical + self.changed + self.missing + self.skipped + self.errors
    }

    /// True when the per-status counters account for every processed outcome
    pub fn is_consistent(&self) -> bool {
        self.category_sum() == self.processed
    }
}
