//! Document classification
//!
//! - `engine`: the per-document state machine
//! - `outcome`: statuses and report rows

pub mod engine;
pub mod outcome;

pub use engine::{CompareEngine, MAX_DIFF_ITEMS};
pub use outcome::{CompareOutcome, CompareStatus};
