//! Compare coordinator - orchestrates a comparison run
//!
//! The coordinator is responsible for:
//! - Indexing the NEW tree (fatal on duplicate keys)
//! - Setting up the report, the task queue and the workers
//! - Walking the OLD tree and submitting one task per document, running
//!   tasks itself when the queue is full
//! - Draining the workers and committing or discarding the report
//! - Progress reporting and final statistics

use crate::compare::CompareEngine;
use crate::config::CompareConfig;
use crate::content::ContentProvider;
use crate::discovery::{discover_documents, DocumentWalker};
use crate::error::{CompareError, ReportError, ReportResult, Result, WorkerError};
use crate::index::DocumentIndex;
use crate::pipeline::queue::{CompareTask, QueueStats, Submission, TaskQueue, TaskQueueSender};
use crate::pipeline::worker::{aggregate_tasks, process_task, Worker};
use crate::report::sink::log_progress;
use crate::report::{ReportFile, ReportSink, TallySnapshot};
use chrono::{DateTime, Local};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// Callback receiving periodic progress snapshots
type ProgressCallback = Box<dyn Fn(&RunProgress) + Send + Sync>;

/// How often the coordinator refreshes progress
const PROGRESS_INTERVAL: Duration = Duration::from_millis(250);

/// Timestamp format for start/end log lines
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Result of a completed comparison
#[derive(Debug)]
pub struct CompareResult {
    /// Final outcome counters
    pub tally: TallySnapshot,

    /// OLD documents discovered (and submitted)
    pub submitted: u64,

    /// Documents in the NEW index
    pub indexed: usize,

    /// NEW documents without an extractable key
    pub unkeyed_new: usize,

    /// Tasks run on the coordinator thread under backpressure
    pub inline_processed: u64,

    /// Times the queue was full on submission
    pub backpressure_events: u64,

    /// Location of the committed report
    pub report_path: PathBuf,

    /// Time taken for the run
    pub duration: Duration,
}

/// Coordinates one comparison run
pub struct CompareCoordinator {
    /// Configuration
    config: Arc<CompareConfig>,

    /// Digest and text source shared by every worker
    content: Arc<dyn ContentProvider>,

    /// Optional progress observer
    on_progress: Option<ProgressCallback>,
}

impl CompareCoordinator {
    /// Create a new coordinator
    pub fn new(config: CompareConfig, content: Arc<dyn ContentProvider>) -> Self {
        Self {
            config: Arc::new(config),
            content,
            on_progress: None,
        }
    }

    /// Receive a progress snapshot a few times per second
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&RunProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Run the comparison
    pub fn run(self) -> Result<CompareResult> {
        let start_time = Instant::now();
        let started_at: DateTime<Local> = Local::now();

        info!(
            old_root = %self.config.old_root.display(),
            new_root = %self.config.new_root.display(),
            workers = self.config.worker_count,
            content = self.content.name(),
            started_at = %started_at.format(TIMESTAMP_FORMAT),
            "Starting comparison"
        );

        // Index the NEW set before anything is written
        let extractor = self.config.extractor();
        let new_docs = discover_documents(&self.config.new_root, &self.config.extension)?;
        let index = DocumentIndex::build(new_docs, &extractor)?;
        info!(
            indexed = index.len(),
            unkeyed = index.unkeyed(),
            "NEW index built"
        );
        for doc in index.iter() {
            trace!(key = %doc.key, path = %doc.path.display(), "Indexed");
        }
        let indexed = index.len();
        let unkeyed_new = index.unkeyed();

        let engine = Arc::new(CompareEngine::new(
            extractor,
            Arc::new(index),
            Arc::clone(&self.content),
        ));

        let (report, writer) =
            ReportFile::create(&self.config.report_dir, &self.config.report_name)?;
        debug!(
            partial = %report.partial_path().display(),
            target = %report.final_path().display(),
            "Writing partial report"
        );

        let totals = match self
            .execute(engine, writer, start_time)
            .and_then(|(writer, totals)| Ok((report.commit(writer)?, totals)))
        {
            Ok((report_path, totals)) => RunTotals {
                report_path,
                ..totals
            },
            Err(e) => {
                error!(error = %e, "Comparison aborted, discarding partial report");
                report.discard();
                return Err(e);
            }
        };

        let duration = start_time.elapsed();
        let tally = totals.tally;
        log_progress(&tally);

        info!(
            processed = tally.processed,
            identical = tally.identical,
            changed = tally.changed,
            missing = tally.missing,
            skipped = tally.skipped,
            errors = tally.errors,
            inline = totals.inline_processed,
            duration_secs = duration.as_secs(),
            finished_at = %Local::now().format(TIMESTAMP_FORMAT),
            report = %totals.report_path.display(),
            "Comparison completed"
        );

        Ok(CompareResult {
            tally,
            submitted: totals.submitted,
            indexed,
            unkeyed_new,
            inline_processed: totals.inline_processed,
            backpressure_events: totals.backpressure_events,
            report_path: totals.report_path,
            duration,
        })
    }

    /// Submit every OLD document, drain the pool and hand back the writer
    fn execute<W: Write + Send + 'static>(
        &self,
        engine: Arc<CompareEngine>,
        writer: W,
        start_time: Instant,
    ) -> Result<(W, RunTotals)> {
        let sink = Arc::new(ReportSink::new(writer, self.config.log_period)?);

        let queue = TaskQueue::new(self.config.queue_size);
        info!(
            workers = self.config.worker_count,
            queue_capacity = queue.capacity(),
            "Starting worker pool"
        );
        let (sender, receiver) = queue.split();
        let stats = sender.stats();

        // Workers own the only receivers; once they are all gone a submit
        // fails instead of filling a queue nobody reads.
        let mut workers = Vec::with_capacity(self.config.worker_count);
        for id in 0..self.config.worker_count {
            match Worker::spawn(id, Arc::clone(&engine), receiver.clone(), Arc::clone(&sink)) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    drop(sender);
                    self.shutdown(workers, &sink, &stats, start_time);
                    return Err(e.into());
                }
            }
        }
        drop(receiver);
        debug!(count = workers.len(), "Workers spawned");

        let submitted = match self.submit_all(&engine, &sink, &sender, &workers, start_time) {
            Ok(submitted) => submitted,
            Err(e) => {
                drop(sender);
                let worker_error = self.shutdown(workers, &sink, &stats, start_time);
                // A closed queue or a poisoned sink means a worker failed first
                return Err(match (e, worker_error) {
                    (CompareError::Worker(WorkerError::QueueClosed), Some(cause))
                    | (CompareError::Report(ReportError::Poisoned), Some(cause)) => cause.into(),
                    (e, _) => e,
                });
            }
        };
        drop(sender);

        info!(submitted, "All OLD documents submitted, draining workers");
        self.wait_for_drain(&workers, &sink, &stats, submitted, start_time)?;

        if let Some(e) = join_workers(workers) {
            return Err(e.into());
        }
        sink.ensure_healthy()?;

        let sink = Arc::try_unwrap(sink).map_err(|_| ReportError::FinalizeFailed {
            path: self.config.report_path(),
            reason: "report sink still in use after drain".to_string(),
        })?;

        let tally = sink.tally().snapshot();
        verify_rows(
            &self.config.report_path(),
            submitted,
            sink.rows_written(),
            &tally,
        )?;
        let writer = sink.into_inner()?;

        Ok((
            writer,
            RunTotals {
                tally,
                submitted,
                inline_processed: stats.inline_count(),
                backpressure_events: stats.backpressure_count(),
                report_path: PathBuf::new(),
            },
        ))
    }

    /// Walk the OLD tree, submitting one task per document
    ///
    /// Runs a task inline whenever the queue is full. Returns the number of
    /// documents submitted.
    fn submit_all<W: Write + Send>(
        &self,
        engine: &CompareEngine,
        sink: &ReportSink<W>,
        sender: &TaskQueueSender,
        workers: &[Worker],
        start_time: Instant,
    ) -> Result<u64> {
        let mut seq = 0u64;
        let mut last_progress = Instant::now();

        for entry in DocumentWalker::new(&self.config.old_root, &self.config.extension) {
            let path = entry?;
            sink.ensure_healthy()?;

            match sender.try_submit(CompareTask::new(path, seq))? {
                Submission::Queued => {}
                Submission::Full(task) => {
                    process_task(engine, sink, &task)?;
                    sender.record_inline();
                }
            }
            seq += 1;

            if last_progress.elapsed() >= PROGRESS_INTERVAL {
                self.report_progress(RunProgress {
                    processed: sink.tally().processed.load(Ordering::Relaxed),
                    submitted: seq,
                    queued: sender.len(),
                    active_workers: sender.active_workers(),
                    total_workers: workers.len(),
                    inline_processed: sender.stats().inline_count(),
                    errors: sink.tally().errors.load(Ordering::Relaxed),
                    elapsed: start_time.elapsed(),
                });
                last_progress = Instant::now();
            }
        }

        Ok(seq)
    }

    /// Wait until every worker has exited or the drain timeout passes
    fn wait_for_drain<W: Write + Send>(
        &self,
        workers: &[Worker],
        sink: &ReportSink<W>,
        stats: &QueueStats,
        submitted: u64,
        start_time: Instant,
    ) -> std::result::Result<(), WorkerError> {
        let check_interval = Duration::from_millis(100);
        let timeout = self.config.drain_timeout;
        // Absurdly large timeouts mean "wait forever"
        let deadline = Instant::now().checked_add(timeout);

        loop {
            let running = workers.iter().filter(|w| !w.is_finished()).count();
            if running == 0 {
                debug!(tasks = aggregate_tasks(workers), "Workers drained");
                return Ok(());
            }

            let now = Instant::now();
            if deadline.is_some_and(|d| now >= d) {
                error!(
                    running,
                    timeout_secs = timeout.as_secs(),
                    "Workers did not drain in time"
                );
                return Err(WorkerError::DrainTimeout { timeout });
            }

            self.report_progress(RunProgress {
                processed: sink.tally().processed.load(Ordering::Relaxed),
                submitted,
                queued: pending(stats),
                active_workers: running,
                total_workers: workers.len(),
                inline_processed: stats.inline_count(),
                errors: sink.tally().errors.load(Ordering::Relaxed),
                elapsed: start_time.elapsed(),
            });

            let remaining = deadline.map_or(check_interval, |d| d - now);
            thread::sleep(check_interval.min(remaining));
        }
    }

    /// Stop the pool after a fatal error, returning the first worker error
    ///
    /// The sender must already be dropped. Workers finish what is queued
    /// (at most one queue's worth) and exit.
    fn shutdown<W: Write + Send>(
        &self,
        workers: Vec<Worker>,
        sink: &ReportSink<W>,
        stats: &QueueStats,
        start_time: Instant,
    ) -> Option<WorkerError> {
        let submitted = stats.enqueued.load(Ordering::Relaxed);
        if let Err(e) = self.wait_for_drain(&workers, sink, stats, submitted, start_time) {
            warn!(error = %e, "Abandoning workers during shutdown");
            return None;
        }
        join_workers(workers)
    }

    fn report_progress(&self, progress: RunProgress) {
        if let Some(ref callback) = self.on_progress {
            callback(&progress);
        }
    }
}

/// Counters gathered by `execute`
struct RunTotals {
    tally: TallySnapshot,
    submitted: u64,
    inline_processed: u64,
    backpressure_events: u64,
    report_path: PathBuf,
}

/// Tasks enqueued but not yet picked up
fn pending(stats: &QueueStats) -> usize {
    let enqueued = stats.enqueued.load(Ordering::Relaxed);
    enqueued.saturating_sub(stats.throughput()) as usize
}

/// Join all worker threads, returning the first failure
///
/// A worker that only saw the sink already poisoned did not cause the
/// failure, so the worker whose write actually failed is preferred.
fn join_workers(workers: Vec<Worker>) -> Option<WorkerError> {
    let mut first_error: Option<WorkerError> = None;
    for worker in workers {
        let id = worker.id();
        if let Err(e) = worker.join() {
            warn!(worker = id, error = %e, "Worker failed");
            match first_error {
                Some(ref current) if !is_poison_echo(current) => {}
                Some(_) if is_poison_echo(&e) => {}
                _ => first_error = Some(e),
            }
        }
    }
    first_error
}

fn is_poison_echo(e: &WorkerError) -> bool {
    matches!(
        e,
        WorkerError::Report {
            source: ReportError::Poisoned,
            ..
        }
    )
}

/// One row per submitted document, and a tally that adds up
fn verify_rows(
    path: &Path,
    submitted: u64,
    rows: u64,
    tally: &TallySnapshot,
) -> ReportResult<()> {
    if rows == submitted && tally.processed == submitted && tally.is_consistent() {
        return Ok(());
    }

    error!(
        submitted,
        rows,
        processed = tally.processed,
        "Report row count does not match submitted documents"
    );
    Err(ReportError::FinalizeFailed {
        path: path.to_path_buf(),
        reason: format!(
            "{} rows written for {} submitted documents ({} counted)",
            rows, submitted, tally.processed
        ),
    })
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct RunProgress {
    /// Outcomes recorded
    pub processed: u64,

    /// OLD documents submitted so far
    pub submitted: u64,

    /// Tasks waiting in the queue
    pub queued: usize,

    /// Workers currently comparing
    pub active_workers: usize,

    /// Total workers
    pub total_workers: usize,

    /// Tasks run inline by the coordinator
    pub inline_processed: u64,

    /// ERROR outcomes so far
    pub errors: u64,

    /// Elapsed time
    pub elapsed: Duration,
}

impl RunProgress {
    /// Calculate documents per second rate
    pub fn docs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompareConfig;
    use crate::content::{ContentKind, TextContentProvider};
    use crate::keys::KeyMode;
    use crate::report::REPORT_HEADER;
    use std::fs;
    use std::io;
    use tempfile::{tempdir, TempDir};

    /// Writer that accepts the header and fails every row after it
    struct FailingWriter {
        remaining: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.remaining {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            self.remaining -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn coordinator(dir: &TempDir, workers: usize, queue_size: usize) -> CompareCoordinator {
        let config = CompareConfig {
            old_root: dir.path().join("old"),
            new_root: dir.path().join("new"),
            report_dir: dir.path().join("report"),
            report_name: "comparison.csv".to_string(),
            configured_workers: workers,
            worker_count: workers,
            queue_size,
            log_period: 10,
            key_mode: KeyMode::Prefix,
            key_start: None,
            key_end: Some(3),
            extension: "txt".to_string(),
            content: ContentKind::Text,
            drain_timeout: Duration::from_secs(60),
            show_progress: false,
            verbose: false,
        };
        CompareCoordinator::new(config, Arc::new(TextContentProvider))
    }

    /// Engine over an empty NEW index, so every OLD document is MISSING_NEW
    fn empty_engine(coordinator: &CompareCoordinator) -> Arc<CompareEngine> {
        let extractor = coordinator.config.extractor();
        let index = DocumentIndex::build(Vec::new(), &extractor).unwrap();
        Arc::new(CompareEngine::new(
            extractor,
            Arc::new(index),
            Arc::clone(&coordinator.content),
        ))
    }

    fn old_tree(dir: &TempDir, count: usize) {
        let old = dir.path().join("old");
        fs::create_dir_all(&old).unwrap();
        fs::create_dir_all(dir.path().join("new")).unwrap();
        for n in 0..count {
            fs::write(old.join(format!("{}_doc.txt", 100 + n)), b"body").unwrap();
        }
    }

    fn is_write_failure(e: &CompareError) -> bool {
        matches!(
            e,
            CompareError::Report(ReportError::Write(_))
                | CompareError::Worker(WorkerError::Report {
                    source: ReportError::Write(_),
                    ..
                })
        )
    }

    #[test]
    fn test_report_write_failure_surfaces_io_error() {
        let dir = tempdir().unwrap();
        old_tree(&dir, 40);

        for (workers, queue_size) in [(1, 1), (4, 64)] {
            let coordinator = coordinator(&dir, workers, queue_size);
            let engine = empty_engine(&coordinator);
            let writer = FailingWriter {
                remaining: REPORT_HEADER.len() + 1,
            };

            let err = match coordinator.execute(engine, writer, Instant::now()) {
                Ok(_) => panic!("run over a failing writer must abort"),
                Err(e) => e,
            };
            assert!(is_write_failure(&err), "unexpected error: {err}");
        }
    }

    #[test]
    fn test_execute_over_healthy_writer_counts_every_row() {
        let dir = tempdir().unwrap();
        old_tree(&dir, 25);

        let coordinator = coordinator(&dir, 2, 2);
        let engine = empty_engine(&coordinator);

        let (writer, totals) = coordinator
            .execute(engine, Vec::new(), Instant::now())
            .unwrap();

        let text = String::from_utf8(writer).unwrap();
        assert_eq!(text.lines().count(), 26);
        assert_eq!(totals.submitted, 25);
        assert_eq!(totals.tally.missing, 25);
    }

    #[test]
    fn test_row_count_mismatch_is_fatal() {
        let path = Path::new("report/comparison.csv");
        let tally = TallySnapshot {
            processed: 3,
            missing: 3,
            ..Default::default()
        };

        assert!(verify_rows(path, 3, 3, &tally).is_ok());

        let short = verify_rows(path, 4, 3, &tally);
        assert!(matches!(short, Err(ReportError::FinalizeFailed { .. })));

        let uneven = TallySnapshot {
            processed: 3,
            missing: 2,
            ..Default::default()
        };
        assert!(verify_rows(path, 3, 3, &uneven).is_err());
    }

    #[test]
    fn test_join_prefers_the_failing_write_over_poison() {
        let poisoned = WorkerError::Report {
            id: 0,
            source: ReportError::Poisoned,
        };
        let write = WorkerError::Report {
            id: 1,
            source: ReportError::Write(io::Error::new(io::ErrorKind::Other, "disk full")),
        };

        assert!(is_poison_echo(&poisoned));
        assert!(!is_poison_echo(&write));
        assert!(!is_poison_echo(&WorkerError::QueueClosed));
    }

    #[test]
    fn test_run_progress_rate() {
        let progress = RunProgress {
            processed: 5000,
            submitted: 5200,
            queued: 16,
            active_workers: 8,
            total_workers: 8,
            inline_processed: 40,
            errors: 3,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.docs_per_second() - 500.0).abs() < 0.1);
    }

    #[test]
    fn test_run_progress_rate_at_start() {
        let progress = RunProgress {
            processed: 0,
            submitted: 0,
            queued: 0,
            active_workers: 0,
            total_workers: 4,
            inline_processed: 0,
            errors: 0,
            elapsed: Duration::ZERO,
        };

        assert_eq!(progress.docs_per_second(), 0.0);
    }

    #[test]
    fn test_pending_never_negative() {
        let stats = QueueStats::default();
        stats.enqueued.store(3, Ordering::Relaxed);
        stats.dequeued.store(5, Ordering::Relaxed);
        assert_eq!(pending(&stats), 0);

        stats.enqueued.store(10, Ordering::Relaxed);
        assert_eq!(pending(&stats), 5);
    }
}
