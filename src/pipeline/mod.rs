//! Parallel comparison pipeline
//!
//! This module provides:
//! - `queue`: bounded task queue with caller-runs backpressure
//! - `worker`: worker threads that classify documents
//! - `coordinator`: orchestrates indexing, submission and drain

pub mod coordinator;
pub mod queue;
pub mod worker;

pub use coordinator::{CompareCoordinator, CompareResult, RunProgress};
pub use queue::{CompareTask, QueueStats, Submission, TaskQueue, TaskQueueReceiver, TaskQueueSender};
pub use worker::{process_task, Worker};
