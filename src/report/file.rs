//! Report file lifecycle
//!
//! Rows go to `<name>.partial` while the run is in progress. Only a run that
//! drains completely commits, renaming the partial file into place; a fatal
//! error discards it. A report on disk therefore always covers every
//! discovered document.

use crate::error::{ReportError, ReportResult};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Buffer size for the report writer
const REPORT_BUFFER_SIZE: usize = 256 * 1024;

/// A report being written
#[derive(Debug)]
pub struct ReportFile {
    final_path: PathBuf,
    partial_path: PathBuf,
}

impl ReportFile {
    /// Create the report directory (if needed) and open the partial file
    ///
    /// A report left over from an earlier run at the final path is removed
    /// so a failed run cannot leave a stale report looking current.
    pub fn create(dir: &Path, name: &str) -> ReportResult<(Self, BufWriter<File>)> {
        let final_path = dir.join(name);
        let partial_path = dir.join(format!("{}.partial", name));

        let create_err = |path: &Path, e: std::io::Error| ReportError::CreateFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        fs::create_dir_all(dir).map_err(|e| create_err(dir, e))?;

        if final_path.exists() {
            debug!(path = %final_path.display(), "Removing report from previous run");
            fs::remove_file(&final_path).map_err(|e| create_err(&final_path, e))?;
        }

        let file = File::create(&partial_path).map_err(|e| create_err(&partial_path, e))?;
        let writer = BufWriter::with_capacity(REPORT_BUFFER_SIZE, file);

        Ok((
            Self {
                final_path,
                partial_path,
            },
            writer,
        ))
    }

    /// Where the report lands once committed
    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    /// Where rows are written during the run
    pub fn partial_path(&self) -> &Path {
        &self.partial_path
    }

    /// Flush, sync and move the report into place
    ///
    /// On failure the partial file is left for the caller to `discard`.
    pub fn commit(&self, writer: BufWriter<File>) -> ReportResult<PathBuf> {
        let finalize_err = |e: std::io::Error| ReportError::FinalizeFailed {
            path: self.final_path.clone(),
            reason: e.to_string(),
        };

        let file = writer
            .into_inner()
            .map_err(|e| finalize_err(e.into_error()))?;
        file.sync_all().map_err(finalize_err)?;
        drop(file);

        fs::rename(&self.partial_path, &self.final_path).map_err(finalize_err)?;
        Ok(self.final_path.clone())
    }

    /// Remove the partial report after a fatal error
    pub fn discard(self) {
        if let Err(e) = fs::remove_file(&self.partial_path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    path = %self.partial_path.display(),
                    error = %e,
                    "Failed to remove partial report"
                );
            }
        }
    }
}
