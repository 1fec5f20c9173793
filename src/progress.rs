//! Progress reporting for comparison runs
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::pipeline::RunProgress;
use crate::report::TallySnapshot;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Progress reporter that displays run status
#[derive(Clone)]
pub struct ProgressReporter {
    /// Progress bar
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        if let Ok(spinner) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update the progress display
    pub fn update(&self, progress: &RunProgress) {
        let msg = format!(
            "Processed: {}/{} | Rate: {:.0}/s | Queue: {} | Workers: {}/{} | Inline: {} | Errors: {}",
            format_number(progress.processed),
            format_number(progress.submitted),
            progress.docs_per_second(),
            progress.queued,
            progress.active_workers,
            progress.total_workers,
            format_number(progress.inline_processed),
            format_number(progress.errors),
        );

        self.bar.set_message(msg);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a summary of the comparison results
pub fn print_summary(tally: &TallySnapshot, inline: u64, duration: Duration, report: &Path) {
    let duration_secs = duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        tally.processed as f64 / duration_secs
    } else {
        0.0
    };

    println!();
    println!("{}", style("Comparison Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Processed:").bold(),
        format_number(tally.processed)
    );
    println!(
        "  {} {}",
        style("Identical:").bold(),
        format_number(tally.identical)
    );
    println!(
        "  {} {}",
        style("Changed:").bold(),
        format_number(tally.changed)
    );
    if tally.missing > 0 {
        println!(
            "  {} {}",
            style("Missing:").yellow().bold(),
            format_number(tally.missing)
        );
    }
    if tally.skipped > 0 {
        println!(
            "  {} {}",
            style("Skipped:").yellow().bold(),
            format_number(tally.skipped)
        );
    }
    if tally.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").red().bold(),
            format_number(tally.errors)
        );
    }
    println!(
        "  {} {:.1}s ({:.0} docs/sec, {} inline)",
        style("Duration:").bold(),
        duration_secs,
        rate,
        format_number(inline)
    );
    println!("  {} {}", style("Report:").bold(), report.display());
    println!();
}

/// Print a header at the start of the run
pub fn print_header(old_root: &Path, new_root: &Path, workers: usize, report: &Path) {
    println!();
    println!(
        "{} {}",
        style("doc-compare").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Old:").bold(), old_root.display());
    println!("  {} {}", style("New:").bold(), new_root.display());
    println!("  {} {}", style("Workers:").bold(), workers);
    println!("  {} {}", style("Report:").bold(), report.display());
    println!();
}
