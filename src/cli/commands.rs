//! Command implementation for the invoice processor CLI
//!
//! Sets up logging, layers the configuration and hands over to the
//! [`InvoiceProcessor`].

use crate::cli::args::Args;
use crate::config::ProcessorConfig;
use crate::processor::{InvoiceProcessor, RunOutcome};
use anyhow::{Context, Result};
use colored::*;
use tracing::{debug, info};

/// Main command runner
///
/// Early exits (no input folder, no files, no records) are returned as
/// `Ok` outcomes; only real failures are errors.
pub async fn run(args: Args) -> Result<RunOutcome> {
    setup_logging(&args);

    info!("Starting invoice processor");
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let config = load_configuration(&args)?;
    debug!("Loaded configuration: {:?}", config);

    let mut processor = InvoiceProcessor::new(config).with_console_output(args.show_progress());
    let outcome = processor.run().await?;

    if args.show_progress() {
        report_early_exit(&outcome);
    }
    Ok(outcome)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("invoice_processor={}", log_level)));

    if args.quiet {
        // Minimal logging for quiet mode
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load configuration: defaults, then config file, then command line
fn load_configuration(args: &Args) -> Result<ProcessorConfig> {
    let config_file = match &args.config_file {
        Some(path) => Some(path.clone()),
        None => ProcessorConfig::default_config_path().filter(|path| path.exists()),
    };

    let base = match &config_file {
        Some(path) => {
            info!("Using config file: {}", path.display());
            ProcessorConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?
        }
        None => {
            info!("No config file found, using defaults");
            ProcessorConfig::default()
        }
    };

    let config = args.apply_to(base);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Console lines for a run that stopped before writing reports
///
/// The processor only logs early exits; this is the one place they reach
/// the console.
fn early_exit_lines(outcome: &RunOutcome) -> Vec<String> {
    match outcome {
        RunOutcome::InputMissing { path } => vec![format!(
            "{} {}",
            "Nothing to do: input folder not found".bright_yellow(),
            path.display()
        )],
        RunOutcome::NoInputFiles { path } => vec![format!(
            "{} {}",
            "Nothing to do: no invoice files in".bright_yellow(),
            path.display()
        )],
        RunOutcome::NoRecords { file_reports } => {
            let mut lines = vec![format!(
                "{}",
                "Nothing to do: no line items found".bright_yellow()
            )];
            lines.extend(file_reports.iter().map(|report| format!("  {}", report.summary())));
            lines
        }
        RunOutcome::Completed(_) => Vec::new(),
    }
}

fn report_early_exit(outcome: &RunOutcome) {
    for line in early_exit_lines(outcome) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_early_exit_lines() {
        colored::control::set_override(false);

        let lines = early_exit_lines(&RunOutcome::InputMissing {
            path: PathBuf::from("/data/invoices"),
        });
        assert_eq!(
            lines,
            vec!["Nothing to do: input folder not found /data/invoices".to_string()]
        );

        let lines = early_exit_lines(&RunOutcome::NoInputFiles {
            path: PathBuf::from("/data/invoices"),
        });
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Nothing to do: no invoice files in"));

        let lines = early_exit_lines(&RunOutcome::NoRecords {
            file_reports: Vec::new(),
        });
        assert_eq!(lines, vec!["Nothing to do: no line items found".to_string()]);
    }
}
