//! doc-compare - Parallel OLD/NEW document set comparison
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use doc_compare::config::{CliArgs, CompareConfig};
use doc_compare::content::ContentProvider;
use doc_compare::pipeline::CompareCoordinator;
use doc_compare::progress::{print_header, print_summary, ProgressReporter};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = CompareConfig::from_args(args).context("Invalid configuration")?;

    info!(
        configured = config.configured_workers,
        resolved = config.worker_count,
        queue_size = config.queue_size,
        log_period = config.log_period,
        key_mode = %config.key_mode,
        extension = %config.extension,
        "Parallelism configured"
    );

    // Print header
    if config.show_progress {
        print_header(
            &config.old_root,
            &config.new_root,
            config.worker_count,
            &config.report_path(),
        );
    }

    let progress = config.show_progress.then(ProgressReporter::new);
    let content: Arc<dyn ContentProvider> = Arc::from(config.content.provider());
    let mut coordinator = CompareCoordinator::new(config.clone(), content);

    if let Some(ref p) = progress {
        p.set_status("Indexing NEW documents...");
        let reporter = p.clone();
        coordinator = coordinator.on_progress(move |run| reporter.update(run));
    }

    // Run the comparison
    let result = match coordinator.run() {
        Ok(result) => result,
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            return Err(e).context("Comparison failed");
        }
    };

    // Finish progress
    if let Some(ref p) = progress {
        p.finish("Comparison completed");
    }

    // Print summary
    if config.show_progress {
        print_summary(
            &result.tally,
            result.inline_processed,
            result.duration,
            &result.report_path,
        );
    }

    if result.tally.errors > 0 {
        info!(errors = result.tally.errors, "Comparison completed with errors");
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("doc_compare=debug,warn")
    } else {
        EnvFilter::new("doc_compare=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
