//! Worker thread logic for parallel comparison
//!
//! Each worker:
//! - Pulls compare tasks from the shared queue
//! - Runs the compare engine on the old document
//! - Hands the outcome to the report sink before taking the next task
//! - Exits when the queue is drained and disconnected, or when the sink fails

use crate::compare::CompareEngine;
use crate::error::{ReportResult, WorkerError};
use crate::pipeline::queue::{CompareTask, TaskQueueReceiver, WorkGuard};
use crate::report::ReportSink;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

/// Statistics collected by a worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Tasks completed by this worker
    pub tasks_processed: AtomicU64,
}

impl WorkerStats {
    fn record_task(&self) {
        self.tasks_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn tasks_processed(&self) -> u64 {
        self.tasks_processed.load(Ordering::Relaxed)
    }
}

/// Classify one document and record the outcome
///
/// Shared by worker threads and by the coordinator when it runs a task
/// inline under backpressure.
pub fn process_task<W: Write + Send>(
    engine: &CompareEngine,
    sink: &ReportSink<W>,
    task: &CompareTask,
) -> ReportResult<()> {
    let outcome = engine.compare(&task.path);
    trace!(
        seq = task.seq,
        key = %outcome.key,
        status = %outcome.status,
        "Document classified"
    );
    sink.record(&outcome)
}

/// A worker thread that processes compare tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<Result<(), WorkerError>>>,

    /// Worker statistics
    stats: Arc<WorkerStats>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn<W: Write + Send + 'static>(
        id: usize,
        engine: Arc<CompareEngine>,
        queue_rx: TaskQueueReceiver,
        sink: Arc<ReportSink<W>>,
    ) -> Result<Self, WorkerError> {
        let stats = Arc::new(WorkerStats::default());
        let stats_clone = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("compare-{}", id))
            .spawn(move || worker_loop(id, engine, queue_rx, sink, stats_clone))
            .map_err(|e| WorkerError::InitFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
            stats,
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> &WorkerStats {
        &self.stats
    }

    /// True once the thread has returned
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, |h| h.is_finished())
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        if let Some(handle) = self.handle.take() {
            match handle.join() {
                Ok(result) => result,
                Err(_) => Err(WorkerError::Panicked {
                    id: self.id,
                    message: "Worker thread panicked".into(),
                }),
            }
        } else {
            Ok(())
        }
    }
}

/// Main worker loop
fn worker_loop<W: Write + Send>(
    id: usize,
    engine: Arc<CompareEngine>,
    queue_rx: TaskQueueReceiver,
    sink: Arc<ReportSink<W>>,
    stats: Arc<WorkerStats>,
) -> Result<(), WorkerError> {
    debug!(worker = id, "Worker starting");

    while let Some(task) = queue_rx.recv() {
        let _guard = WorkGuard::new(&queue_rx);

        if let Err(e) = process_task(&engine, &*sink, &task) {
            error!(worker = id, path = %task.path.display(), error = %e, "Stopping worker");
            return Err(WorkerError::Report { id, source: e });
        }
        stats.record_task();
    }

    debug!(
        worker = id,
        tasks = stats.tasks_processed(),
        "Worker shutting down"
    );

    Ok(())
}

/// Total tasks completed across workers
pub fn aggregate_tasks(workers: &[Worker]) -> u64 {
    workers.iter().map(|w| w.stats.tasks_processed()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();

        stats.record_task();
        stats.record_task();

        assert_eq!(stats.tasks_processed(), 2);
    }
}
