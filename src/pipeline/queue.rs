//! Task queue with caller-runs backpressure
//!
//! This module provides a bounded queue of comparison tasks. When the queue
//! is full the submitter gets its task back and is expected to run it
//! itself. That bounds memory, ties the submission rate to the completion
//! rate, and never drops or blocks on a task.

use crate::error::WorkerError;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// A request to classify one old document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareTask {
    /// Path of the old document
    pub path: PathBuf,

    /// Submission order (0-based), for logging
    pub seq: u64,
}

impl CompareTask {
    /// Create a new task
    pub fn new(path: PathBuf, seq: u64) -> Self {
        Self { path, seq }
    }
}

/// Result of a non-blocking submission
#[derive(Debug)]
pub enum Submission {
    /// Task accepted by the queue
    Queued,

    /// Queue full; the caller must run the task itself
    Full(CompareTask),
}

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued by workers
    pub dequeued: AtomicU64,

    /// Tasks run on the submitting thread due to backpressure
    pub inline_processed: AtomicU64,

    /// Number of times the queue was full on submission
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (dequeued tasks)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get number of inline-processed tasks
    pub fn inline_count(&self) -> u64 {
        self.inline_processed.load(Ordering::Relaxed)
    }

    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Bounded task queue
pub struct TaskQueue {
    sender: Sender<CompareTask>,
    receiver: Receiver<CompareTask>,
    capacity: usize,
    active_workers: Arc<AtomicUsize>,
    stats: Arc<QueueStats>,
}

impl TaskQueue {
    /// Create a queue holding at most `capacity` waiting tasks
    ///
    /// A capacity of zero is raised to one; a rendezvous channel would turn
    /// every submission into an inline run whenever no worker is idle.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            active_workers: Arc::new(AtomicUsize::new(0)),
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Split into the submitting half and the worker half
    ///
    /// Dropping the returned sender (and every clone of it) disconnects the
    /// queue; workers then drain what is left and stop.
    pub fn split(self) -> (TaskQueueSender, TaskQueueReceiver) {
        let sender = TaskQueueSender {
            sender: self.sender,
            active_workers: Arc::clone(&self.active_workers),
            stats: Arc::clone(&self.stats),
        };
        let receiver = TaskQueueReceiver {
            receiver: self.receiver,
            active_workers: self.active_workers,
            stats: self.stats,
        };
        (sender, receiver)
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Handle for submitting tasks
#[derive(Clone)]
pub struct TaskQueueSender {
    sender: Sender<CompareTask>,
    active_workers: Arc<AtomicUsize>,
    stats: Arc<QueueStats>,
}

impl TaskQueueSender {
    /// Try to enqueue a task without blocking
    ///
    /// Returns `Full(task)` if the queue is at capacity (backpressure) and
    /// `Err` if every worker has gone away.
    pub fn try_submit(&self, task: CompareTask) -> Result<Submission, WorkerError> {
        match self.sender.try_send(task) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                Ok(Submission::Queued)
            }
            Err(TrySendError::Full(task)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                Ok(Submission::Full(task))
            }
            Err(TrySendError::Disconnected(_)) => Err(WorkerError::QueueClosed),
        }
    }

    /// Record that a task was processed inline (for stats)
    pub fn record_inline(&self) {
        self.stats.inline_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Workers currently processing a task
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Handle for receiving tasks (clone for each worker)
#[derive(Clone)]
pub struct TaskQueueReceiver {
    receiver: Receiver<CompareTask>,
    active_workers: Arc<AtomicUsize>,
    stats: Arc<QueueStats>,
}

impl TaskQueueReceiver {
    /// Receive a task, blocking until one is available
    ///
    /// Returns `None` once the queue is empty and every sender is gone.
    pub fn recv(&self) -> Option<CompareTask> {
        match self.receiver.recv() {
            Ok(task) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(task)
            }
            Err(_) => None,
        }
    }

    /// Try to receive a task without blocking
    pub fn try_recv(&self) -> Option<CompareTask> {
        match self.receiver.try_recv() {
            Ok(task) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(task)
            }
            Err(_) => None,
        }
    }

    /// Mark this worker as active
    pub fn begin_work(&self) {
        self.active_workers.fetch_add(1, Ordering::SeqCst);
    }

    /// Mark this worker as idle
    pub fn end_work(&self) {
        self.active_workers.fetch_sub(1, Ordering::SeqCst);
    }

    /// Workers currently processing a task
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::SeqCst)
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// RAII guard for marking work as active
pub struct WorkGuard<'a> {
    receiver: &'a TaskQueueReceiver,
}

impl<'a> WorkGuard<'a> {
    /// Create a new work guard (marks worker as active)
    pub fn new(receiver: &'a TaskQueueReceiver) -> Self {
        receiver.begin_work();
        Self { receiver }
    }
}

impl Drop for WorkGuard<'_> {
    fn drop(&mut self) {
        self.receiver.end_work();
    }
}
