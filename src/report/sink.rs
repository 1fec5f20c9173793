//! Thread-safe CSV report sink
//!
//! Workers (and the coordinator, when it runs tasks inline) hand every
//! outcome to the sink. Rows are written under a mutex so lines never
//! interleave; counters are atomics so progress can be read without taking
//! the lock.
//!
//! A failed write poisons the sink: every later `record` fails too, because
//! a report with a hole in it cannot be trusted.

use crate::compare::CompareOutcome;
use crate::error::{ReportError, ReportResult};
use crate::report::tally::{RunningTally, TallySnapshot};
use parking_lot::Mutex;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{error, info};

/// First line of every report
pub const REPORT_HEADER: &str = "business_key,status,reason";

/// Serialized row writer plus running tally
pub struct ReportSink<W: Write + Send> {
    writer: Mutex<W>,
    tally: RunningTally,
    rows_written: AtomicU64,
    log_period: u64,
    failed: AtomicBool,
}

impl<W: Write + Send> ReportSink<W> {
    /// Wrap a writer and emit the header
    ///
    /// `log_period` controls how often (in processed outcomes) a progress
    /// line is logged; it is clamped to at least 1.
    pub fn new(mut writer: W, log_period: u64) -> ReportResult<Self> {
        writeln!(writer, "{}", REPORT_HEADER).map_err(ReportError::Write)?;

        Ok(Self {
            writer: Mutex::new(writer),
            tally: RunningTally::default(),
            rows_written: AtomicU64::new(0),
            log_period: log_period.max(1),
            failed: AtomicBool::new(false),
        })
    }

    /// Write one outcome and count it
    pub fn record(&self, outcome: &CompareOutcome) -> ReportResult<()> {
        self.ensure_healthy()?;

        let row = outcome.to_csv_row();
        {
            let mut writer = self.writer.lock();
            if let Err(e) = writeln!(writer, "{}", row) {
                self.failed.store(true, Ordering::SeqCst);
                error!(key = %outcome.key, error = %e, "Report write failed");
                return Err(ReportError::Write(e));
            }
        }
        self.rows_written.fetch_add(1, Ordering::Relaxed);

        let processed = self.tally.record(outcome.status);
        if processed % self.log_period == 0 {
            log_progress(&self.tally.snapshot());
        }

        Ok(())
    }

    /// Fail if an earlier write failed
    pub fn ensure_healthy(&self) -> ReportResult<()> {
        if self.has_failed() {
            Err(ReportError::Poisoned)
        } else {
            Ok(())
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    /// Running counters
    pub fn tally(&self) -> &RunningTally {
        &self.tally
    }

    /// Data rows written so far (header excluded)
    pub fn rows_written(&self) -> u64 {
        self.rows_written.load(Ordering::Relaxed)
    }

    /// Flush and return the underlying writer
    pub fn into_inner(self) -> ReportResult<W> {
        self.ensure_healthy()?;
        let mut writer = self.writer.into_inner();
        writer.flush().map_err(ReportError::Write)?;
        Ok(writer)
    }
}

/// Log a progress line from a tally snapshot
pub fn log_progress(snapshot: &TallySnapshot) {
    info!(
        processed = snapshot.processed,
        identical = snapshot.identical,
        changed = snapshot.changed,
        missing = snapshot.missing,
        skipped = snapshot.skipped,
        errors = snapshot.errors,
        "Progress"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::CompareStatus;
    use std::io;
    use std::sync::Arc;
    use std::thread;

    /// Writer that fails once `remaining` bytes have been accepted
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

    fn lines(bytes: Vec<u8>) -> Vec<String> {
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_header_written_once() {
        let sink = ReportSink::new(Vec::new(), 10).unwrap();
        sink.record(&CompareOutcome::missing_new("A")).unwrap();
        sink.record(&CompareOutcome::identical_binary("B")).unwrap();

        let lines = lines(sink.into_inner().unwrap());
        assert_eq!(lines[0], REPORT_HEADER);
        assert_eq!(lines.iter().filter(|l| *l == REPORT_HEADER).count(), 1);
        assert_eq!(lines[1], "A,MISSING_NEW,No matching file in NEW set");
        assert_eq!(lines[2], "B,IDENTICAL_BINARY,Exact match");
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let sink = ReportSink::new(Vec::new(), 10).unwrap();
        assert_eq!(lines(sink.into_inner().unwrap()), vec![REPORT_HEADER.to_string()]);
    }

    #[test]
    fn test_concurrent_rows_do_not_interleave() {
        let sink = Arc::new(ReportSink::new(Vec::new(), 100).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for n in 0..250 {
                        let outcome = CompareOutcome::text_changed(
                            format!("key-{}-{}", t, n),
                            "REMOVED: [a, b, c] | ADDED: [d]",
                        );
                        sink.record(&outcome).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let sink = Arc::try_unwrap(sink).ok().unwrap();
        assert_eq!(sink.rows_written(), 2000);
        assert!(sink.tally().snapshot().is_consistent());

        let lines = lines(sink.into_inner().unwrap());
        assert_eq!(lines.len(), 2001);
        for line in &lines[1..] {
            assert_eq!(line.split(',').count(), 3, "malformed row: {}", line);
            assert!(line.ends_with("REMOVED: [a  b  c] | ADDED: [d]"));
        }
    }

    #[test]
    fn test_tally_follows_rows() {
        let sink = ReportSink::new(Vec::new(), 1).unwrap();
        sink.record(&CompareOutcome::error("x", "boom")).unwrap();
        sink.record(&CompareOutcome::skipped("y.pdf")).unwrap();

        let snap = sink.tally().snapshot();
        assert_eq!(snap.processed, 2);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.skipped, 1);
        assert_eq!(sink.rows_written(), 2);
    }

    #[test]
    fn test_write_failure_poisons_sink() {
        let header_len = REPORT_HEADER.len() + 1;
        let sink = ReportSink::new(FailingWriter { remaining: header_len }, 10).unwrap();

        let first = sink.record(&CompareOutcome::new("k", CompareStatus::Error, "x"));
        assert!(matches!(first, Err(ReportError::Write(_))));
        assert!(sink.has_failed());

        let second = sink.record(&CompareOutcome::missing_new("k2"));
        assert!(matches!(second, Err(ReportError::Poisoned)));
        assert_eq!(sink.tally().snapshot().processed, 0);
    }
}
