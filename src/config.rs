//! Configuration types for doc-compare
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros (every flag can also come
//!   from a `COMPARE_*` environment variable)
//! - Runtime configuration with validation

use crate::content::ContentKind;
use crate::error::ConfigError;
use crate::keys::{FilenameKeyExtractor, KeyMode};
use clap::Parser;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Minimum queue size
const MIN_QUEUE_SIZE: usize = 1;

/// Report names are plain file names
static REPORT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/\\]+$").expect("Invalid report name regex"));

/// Compare an OLD document tree against a NEW one
#[derive(Parser, Debug, Clone)]
#[command(
    name = "doc-compare",
    version,
    about = "Compare an OLD document set against a NEW one by business key",
    long_about = "Pairs every OLD document with the NEW document carrying the same business key \
                  (a substring of the file name) and classifies the pair as binary-identical, \
                  text-identical, or changed.\n\n\
                  Writes one CSV row per OLD document.",
    after_help = "EXAMPLES:\n    \
        doc-compare --old-root /data/old --new-root /data/new --key-end 10\n    \
        doc-compare --old-root a --new-root b --key-mode range --key-start 4 --key-end 12 -w 8\n    \
        doc-compare --old-root a --new-root b --key-end 6 --extension txt --content text"
)]
pub struct CliArgs {
    /// Root of the OLD document tree
    #[arg(long, env = "COMPARE_OLD_ROOT", value_name = "DIR")]
    pub old_root: PathBuf,

    /// Root of the NEW document tree
    #[arg(long, env = "COMPARE_NEW_ROOT", value_name = "DIR")]
    pub new_root: PathBuf,

    /// Directory the report is written to (created if missing)
    #[arg(
        short = 'o',
        long,
        env = "COMPARE_REPORT_DIR",
        default_value = "report",
        value_name = "DIR"
    )]
    pub report_dir: PathBuf,

    /// Report file name
    #[arg(
        long,
        env = "COMPARE_REPORT_NAME",
        default_value = "comparison.csv",
        value_name = "NAME"
    )]
    pub report_name: String,

    /// Number of worker threads (0 = number of CPUs)
    #[arg(
        short = 'w',
        long,
        env = "COMPARE_PARALLELISM",
        default_value_t = 0,
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Task queue capacity (default: 2x workers)
    #[arg(long, env = "COMPARE_QUEUE_SIZE", value_name = "NUM")]
    pub queue_size: Option<usize>,

    /// Log a progress line every N processed documents
    #[arg(
        long,
        env = "COMPARE_LOG_PERIOD",
        default_value_t = 1000,
        value_name = "NUM"
    )]
    pub log_period: u64,

    /// Which part of the file name forms the business key
    #[arg(
        long,
        env = "COMPARE_KEY_MODE",
        value_enum,
        default_value_t = KeyMode::Prefix
    )]
    pub key_mode: KeyMode,

    /// First character of the key (range and suffix modes)
    #[arg(long, env = "COMPARE_KEY_START", value_name = "INDEX")]
    pub key_start: Option<usize>,

    /// One past the last character of the key (prefix and range modes)
    #[arg(long, env = "COMPARE_KEY_END", value_name = "INDEX")]
    pub key_end: Option<usize>,

    /// Document file extension (case-insensitive)
    #[arg(
        long,
        env = "COMPARE_EXTENSION",
        default_value = "pdf",
        value_name = "EXT"
    )]
    pub extension: String,

    /// How document text and digests are obtained
    #[arg(
        long,
        env = "COMPARE_CONTENT",
        value_enum,
        default_value_t = ContentKind::Pdf
    )]
    pub content: ContentKind,

    /// Seconds to wait for workers to drain after submission ends
    #[arg(
        long,
        env = "COMPARE_DRAIN_TIMEOUT",
        default_value_t = 3600,
        value_name = "SECS"
    )]
    pub drain_timeout: u64,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

fn default_workers() -> usize {
    num_cpus::get().max(1)
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// OLD document root
    pub old_root: PathBuf,

    /// NEW document root
    pub new_root: PathBuf,

    /// Report directory
    pub report_dir: PathBuf,

    /// Report file name
    pub report_name: String,

    /// Worker count as requested (0 = auto)
    pub configured_workers: usize,

    /// Number of worker threads
    pub worker_count: usize,

    /// Task queue capacity
    pub queue_size: usize,

    /// Progress log period, in processed documents
    pub log_period: u64,

    /// Business key mode
    pub key_mode: KeyMode,

    /// Key start bound
    pub key_start: Option<usize>,

    /// Key end bound
    pub key_end: Option<usize>,

    /// Document extension, without the leading dot
    pub extension: String,

    /// Content provider kind
    pub content: ContentKind,

    /// Drain timeout
    pub drain_timeout: Duration,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl CompareConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        validate_root("old", &args.old_root)?;
        validate_root("new", &args.new_root)?;

        // Validate worker count
        if args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }
        let worker_count = if args.workers == 0 {
            default_workers()
        } else {
            args.workers
        };

        // Validate queue size
        let queue_size = args.queue_size.unwrap_or(worker_count * 2);
        if queue_size < MIN_QUEUE_SIZE {
            return Err(ConfigError::InvalidQueueSize {
                size: queue_size,
                min: MIN_QUEUE_SIZE,
            });
        }

        if args.log_period == 0 {
            return Err(ConfigError::InvalidLogPeriod {
                period: args.log_period,
            });
        }

        validate_key_bounds(args.key_mode, args.key_start, args.key_end)?;

        let extension = args.extension.trim().trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(ConfigError::EmptyExtension);
        }

        if !REPORT_NAME_REGEX.is_match(&args.report_name) || args.report_name.ends_with('.') {
            return Err(ConfigError::InvalidReportName {
                name: args.report_name,
                reason: "must be a plain file name".to_string(),
            });
        }

        Ok(Self {
            old_root: args.old_root,
            new_root: args.new_root,
            report_dir: args.report_dir,
            report_name: args.report_name,
            configured_workers: args.workers,
            worker_count,
            queue_size,
            log_period: args.log_period,
            key_mode: args.key_mode,
            key_start: args.key_start,
            key_end: args.key_end,
            extension,
            content: args.content,
            drain_timeout: Duration::from_secs(args.drain_timeout),
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// Key extractor for the configured mode and bounds
    pub fn extractor(&self) -> FilenameKeyExtractor {
        FilenameKeyExtractor::new(self.key_mode, self.key_start, self.key_end)
    }

    /// Final location of the report
    pub fn report_path(&self) -> PathBuf {
        self.report_dir.join(&self.report_name)
    }
}

fn validate_root(role: &'static str, path: &Path) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidRoot {
        role,
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.exists() {
        return Err(invalid("does not exist"));
    }
    if !path.is_dir() {
        return Err(invalid("not a directory"));
    }
    Ok(())
}

fn validate_key_bounds(
    mode: KeyMode,
    start: Option<usize>,
    end: Option<usize>,
) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidKeyBounds {
        mode: mode.to_string(),
        reason: reason.to_string(),
    };

    match (mode, start, end) {
        (KeyMode::Prefix, _, None) => Err(invalid("--key-end is required")),
        (KeyMode::Prefix, _, Some(0)) => Err(invalid("--key-end must be at least 1")),
        (KeyMode::Range, None, _) | (KeyMode::Suffix, None, _) => {
            Err(invalid("--key-start is required"))
        }
        (KeyMode::Range, _, None) => Err(invalid("--key-end is required")),
        (KeyMode::Range, Some(s), Some(e)) if s >= e => {
            Err(invalid("--key-start must be less than --key-end"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    struct Roots {
        old: TempDir,
        new: TempDir,
    }

    fn roots() -> Roots {
        Roots {
            old: TempDir::new().unwrap(),
            new: TempDir::new().unwrap(),
        }
    }

    fn parse(roots: &Roots, extra: &[&str]) -> Result<CompareConfig, ConfigError> {
        let mut argv = vec![
            "doc-compare".to_string(),
            "--old-root".to_string(),
            roots.old.path().display().to_string(),
            "--new-root".to_string(),
            roots.new.path().display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        CompareConfig::from_args(CliArgs::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_defaults() {
        let roots = roots();
        let config = parse(&roots, &["--key-end", "10"]).unwrap();

        assert_eq!(config.configured_workers, 0);
        assert_eq!(config.worker_count, num_cpus::get().max(1));
        assert_eq!(config.queue_size, config.worker_count * 2);
        assert_eq!(config.log_period, 1000);
        assert_eq!(config.extension, "pdf");
        assert_eq!(config.content, ContentKind::Pdf);
        assert_eq!(config.drain_timeout, Duration::from_secs(3600));
        assert_eq!(config.report_path(), PathBuf::from("report/comparison.csv"));
        assert!(config.show_progress);
    }

    #[test]
    fn test_explicit_workers_and_queue() {
        let roots = roots();
        let config = parse(&roots, &["--key-end", "4", "-w", "3", "--queue-size", "1"]).unwrap();
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.queue_size, 1);
    }

    #[test]
    fn test_missing_root_rejected() {
        let roots = roots();
        let missing = roots.old.path().join("nope");
        let args = CliArgs::try_parse_from([
            "doc-compare",
            "--old-root",
            missing.to_str().unwrap(),
            "--new-root",
            roots.new.path().to_str().unwrap(),
            "--key-end",
            "3",
        ])
        .unwrap();

        let err = CompareConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot { role: "old", .. }));
    }

    #[test]
    fn test_root_must_be_directory() {
        let roots = roots();
        let file = roots.new.path().join("file.pdf");
        std::fs::write(&file, b"x").unwrap();
        let args = CliArgs::try_parse_from([
            "doc-compare",
            "--old-root",
            roots.old.path().to_str().unwrap(),
            "--new-root",
            file.to_str().unwrap(),
            "--key-end",
            "3",
        ])
        .unwrap();

        let err = CompareConfig::from_args(args).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot { role: "new", .. }));
    }

    #[test]
    fn test_invalid_numbers() {
        let roots = roots();
        assert!(matches!(
            parse(&roots, &["--key-end", "3", "-w", "513"]),
            Err(ConfigError::InvalidWorkerCount { count: 513, .. })
        ));
        assert!(matches!(
            parse(&roots, &["--key-end", "3", "--queue-size", "0"]),
            Err(ConfigError::InvalidQueueSize { size: 0, .. })
        ));
        assert!(matches!(
            parse(&roots, &["--key-end", "3", "--log-period", "0"]),
            Err(ConfigError::InvalidLogPeriod { period: 0 })
        ));
    }

    #[test]
    fn test_key_bounds_per_mode() {
        let roots = roots();
        assert!(matches!(
            parse(&roots, &[]),
            Err(ConfigError::InvalidKeyBounds { .. })
        ));
        assert!(matches!(
            parse(&roots, &["--key-mode", "range", "--key-start", "5", "--key-end", "5"]),
            Err(ConfigError::InvalidKeyBounds { .. })
        ));
        assert!(matches!(
            parse(&roots, &["--key-mode", "suffix"]),
            Err(ConfigError::InvalidKeyBounds { .. })
        ));

        let config = parse(
            &roots,
            &["--key-mode", "range", "--key-start", "2", "--key-end", "6"],
        )
        .unwrap();
        assert_eq!(config.extractor(), FilenameKeyExtractor::range(2, 6));

        let config = parse(&roots, &["--key-mode", "suffix", "--key-start", "3"]).unwrap();
        assert_eq!(config.extractor(), FilenameKeyExtractor::suffix(3));
    }

    #[test]
    fn test_extension_and_report_name() {
        let roots = roots();
        let config = parse(&roots, &["--key-end", "3", "--extension", ".TXT"]).unwrap();
        assert_eq!(config.extension, "TXT");

        assert!(matches!(
            parse(&roots, &["--key-end", "3", "--extension", "."]),
            Err(ConfigError::EmptyExtension)
        ));
        assert!(matches!(
            parse(&roots, &["--key-end", "3", "--report-name", "a/b.csv"]),
            Err(ConfigError::InvalidReportName { .. })
        ));
    }
}
