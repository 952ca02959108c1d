//! Command-line argument definitions for the invoice processor
//!
//! Every flag is optional: values not given on the command line come from
//! the configuration file, then from built-in defaults.

use crate::config::{ProcessorConfig, ScanLimits};
use crate::error::{ProcessorError, Result};
use clap::Parser;
use std::path::PathBuf;

/// Upper bound for `--workers`, far above any sensible CPU count
const MAX_WORKERS: usize = 256;

/// CLI arguments for the invoice processor
///
/// Reads transport invoices from a folder of spreadsheets and writes one
/// report per vehicle and one per driver.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "invoice-processor",
    version,
    about = "Build per-vehicle and per-driver reports from spreadsheet invoices",
    long_about = "Scans every invoice workbook in a folder, locates the billing table by its \
                  headers, extracts date, route, plate, driver and amount from each line item, \
                  checks the merged data for duplicates, gaps and unusual amounts, and writes \
                  one .xlsx report per vehicle and per driver."
)]
pub struct Args {
    /// Folder with invoice workbooks
    #[arg(
        short = 'i',
        long = "input",
        value_name = "PATH",
        help = "Folder with invoice workbooks"
    )]
    pub input_dir: Option<PathBuf>,

    /// Folder that receives the report folders
    ///
    /// Reports go to `<output>/by-vehicle` and `<output>/by-driver`.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        help = "Folder that receives the report folders"
    )]
    pub output_dir: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for invoice-processor/config.toml in the
    /// user configuration directory.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Month label for report names instead of detecting it
    #[arg(long = "month", value_name = "NAME")]
    pub month: Option<String>,

    /// Glob pattern selecting invoice files
    #[arg(long = "pattern", value_name = "GLOB")]
    pub file_pattern: Option<String>,

    /// Number of files parsed concurrently (0 = one per CPU)
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of files parsed concurrently (0 = one per CPU)"
    )]
    pub workers: Option<usize>,

    /// Keep line items without a recognizable plate
    ///
    /// Such rows reach the quality check and the driver reports but never a
    /// vehicle report.
    #[arg(long = "keep-unplated")]
    pub keep_unplated: bool,

    /// Parse and check invoices without writing reports
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Args {
    /// Check flag values that clap cannot check on its own
    pub fn validate(&self) -> Result<()> {
        if let Some(config_file) = &self.config_file {
            if !config_file.is_file() {
                return Err(ProcessorError::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        if let Some(workers) = self.workers {
            if workers > MAX_WORKERS {
                return Err(ProcessorError::configuration(format!(
                    "Too many workers: {} (maximum {})",
                    workers, MAX_WORKERS
                )));
            }
        }

        if let Some(month) = &self.month {
            if month.trim().is_empty() {
                return Err(ProcessorError::configuration("Month label must not be empty"));
            }
        }

        Ok(())
    }

    /// Apply command-line values on top of a loaded configuration
    pub fn apply_to(&self, mut config: ProcessorConfig) -> ProcessorConfig {
        if let Some(input_dir) = &self.input_dir {
            config.input_dir = input_dir.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(pattern) = &self.file_pattern {
            config = config.with_file_pattern(pattern.clone());
        }
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(month) = &self.month {
            config = config.with_month(month.trim());
        }
        if self.keep_unplated {
            let scan = ScanLimits {
                keep_unplated_rows: true,
                ..config.scan
            };
            config = config.with_scan_limits(scan);
        }
        if self.dry_run {
            config = config.with_dry_run();
        }
        config
    }

    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress and the console summary
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}
