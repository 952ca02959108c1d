//! Main processing engine with modular architecture.
//!
//! Orchestrates a complete invoice run: file discovery, month detection,
//! ingestion, quality audit and report writing, using the specialized
//! modules below.

pub mod discovery;
pub mod ingest;
pub mod record_parser;
pub mod stats;
pub mod summary;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::{FileDiscovery, display_name};
use self::ingest::FileIngestor;
use self::record_parser::RecordParser;
use self::stats::FileParseReport;
use self::writer::{ReportSink, XlsxReportWriter};

use crate::audit::{AuditReport, QualityAuditor};
use crate::config::ProcessorConfig;
use crate::error::{ProcessorError, Result};
use crate::models::Dataset;
use crate::month::detect_month;
use crate::report::{ReportKind, build_reports};
use crate::workbook::{CalamineReader, WorkbookReader};

use chrono::NaiveDate;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How a run ended
///
/// Only a completed run produces reports. The other variants are normal
/// early exits, not failures.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The input folder does not exist
    InputMissing { path: PathBuf },
    /// The input folder holds no matching files
    NoInputFiles { path: PathBuf },
    /// Files were read but none yielded a record
    NoRecords { file_reports: Vec<FileParseReport> },
    Completed(RunSummary),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed(_))
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            _ => None,
        }
    }
}

/// One report produced (or, in a dry run, planned) by a run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub kind: ReportKind,
    pub key: String,
    pub path: PathBuf,
    pub record_count: usize,
    pub total: Decimal,
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub month: String,
    pub file_reports: Vec<FileParseReport>,
    pub dataset: Dataset,
    pub audit: AuditReport,
    pub reports: Vec<ReportFile>,
    pub dry_run: bool,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn files_seen(&self) -> usize {
        self.file_reports.len()
    }

    pub fn files_parsed(&self) -> usize {
        self.file_reports.iter().filter(|r| r.is_parsed()).count()
    }

    pub fn record_count(&self) -> usize {
        self.dataset.len()
    }

    /// Distinct plates in first-seen order
    pub fn unique_plates(&self) -> Vec<&str> {
        first_seen(self.dataset.iter().filter_map(|r| r.plate.as_deref()))
    }

    /// Distinct driver surnames in first-seen order
    pub fn unique_drivers(&self) -> Vec<&str> {
        first_seen(self.dataset.iter().filter_map(|r| r.driver.as_deref()))
    }

    pub fn grand_total(&self) -> Decimal {
        self.dataset.iter().map(|r| r.amount).sum()
    }

    pub fn reports_of(&self, kind: ReportKind) -> impl Iterator<Item = &ReportFile> {
        self.reports.iter().filter(move |r| r.kind == kind)
    }
}

fn first_seen<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|value| seen.insert(*value)).collect()
}

/// Main processor for a folder of invoices
pub struct InvoiceProcessor {
    config: ProcessorConfig,
    reader: Arc<dyn WorkbookReader>,
    sink: Box<dyn ReportSink>,
    console_output: bool,
    today: Option<NaiveDate>,
}

impl InvoiceProcessor {
    /// Create a processor reading and writing real workbooks
    pub fn new(config: ProcessorConfig) -> Self {
        Self {
            config,
            reader: Arc::new(CalamineReader),
            sink: Box::new(XlsxReportWriter::new()),
            console_output: true,
            today: None,
        }
    }

    pub fn with_reader(mut self, reader: Arc<dyn WorkbookReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Print progress and the colored summary to stdout
    pub fn with_console_output(mut self, enabled: bool) -> Self {
        self.console_output = enabled;
        self
    }

    /// Fix the date used when no month can be detected from file names
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Main processing entry point
    pub async fn run(&mut self) -> Result<RunOutcome> {
        let start_time = Instant::now();
        self.config.validate()?;

        if self.console_output {
            println!("{}", "Starting invoice processing".bright_green().bold());
            println!(
                "  {} {}",
                "Input:".bright_cyan(),
                self.config.input_dir.display()
            );
            println!(
                "  {} {}",
                "Output:".bright_cyan(),
                self.config.output_dir.display()
            );
        }

        // Step 1: Discover invoice files
        let discovery = FileDiscovery::new(&self.config.input_dir, &self.config.file_pattern);
        let files = match discovery.discover_invoice_files() {
            Ok(files) => files,
            Err(ProcessorError::InputNotFound { path }) => {
                warn!("Input folder not found: {}", path.display());
                return Ok(RunOutcome::InputMissing { path });
            }
            Err(e) => return Err(e),
        };

        if files.is_empty() {
            warn!("No files matching {} found", self.config.file_pattern);
            return Ok(RunOutcome::NoInputFiles {
                path: self.config.input_dir.clone(),
            });
        }

        if self.console_output {
            println!(
                "  {} {} invoice files",
                "Found".bright_green(),
                files.len().to_string().bright_white().bold()
            );
        }

        // Step 2: Month label for report names
        let month = self.resolve_month(&files);
        info!("Report month: {}", month);
        if self.console_output {
            println!("  {} {}", "Month:".bright_cyan(), month);
        }

        // Step 3: Parse all files
        let ingestor = FileIngestor::new(
            Arc::clone(&self.reader),
            RecordParser::new(self.config.scan),
        );
        let progress_bar = self.console_output.then(|| create_progress_bar(files.len()));
        let ingested = ingestor
            .ingest(
                &files,
                self.config.effective_workers(),
                progress_bar.as_ref(),
            )
            .await?;
        if let Some(pb) = &progress_bar {
            pb.finish_and_clear();
        }

        for report in &ingested.reports {
            debug!("{}", report.summary());
        }

        if ingested.dataset.is_empty() {
            warn!("No records extracted from {} files", files.len());
            return Ok(RunOutcome::NoRecords {
                file_reports: ingested.reports,
            });
        }

        // Step 4: Quality audit
        let audit = QualityAuditor::new(self.config.outlier_sigma).audit(&ingested.dataset);

        // Step 5: Reports
        let reports = self.write_reports(&ingested.dataset, &month)?;

        let summary = RunSummary {
            month,
            file_reports: ingested.reports,
            dataset: ingested.dataset,
            audit,
            reports,
            dry_run: self.config.dry_run,
            elapsed: start_time.elapsed(),
        };

        info!(
            "Run complete: {} records, {} reports in {:.2?}",
            summary.record_count(),
            summary.reports.len(),
            summary.elapsed
        );
        if self.console_output {
            summary::print_summary(&summary, &self.config);
        }

        Ok(RunOutcome::Completed(summary))
    }

    fn resolve_month(&self, files: &[PathBuf]) -> String {
        if let Some(month) = &self.config.month {
            return month.clone();
        }
        let names: Vec<String> = files.iter().map(|path| display_name(path)).collect();
        let today = self
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        detect_month(&names, today)
    }

    fn write_reports(&mut self, dataset: &Dataset, month: &str) -> Result<Vec<ReportFile>> {
        let targets = [
            (ReportKind::Vehicle, self.config.vehicle_output_dir()),
            (ReportKind::Driver, self.config.driver_output_dir()),
        ];

        if self.config.dry_run {
            info!("Dry run: no report files will be written");
        } else {
            for (_, dir) in &targets {
                create_output_dir(dir)?;
            }
        }

        let mut written = Vec::new();
        for (kind, dir) in &targets {
            for table in build_reports(dataset, *kind) {
                let path = dir.join(table.file_name(month));
                if !self.config.dry_run {
                    self.sink.write(&table, &path)?;
                }
                written.push(ReportFile {
                    kind: *kind,
                    key: table.key.clone(),
                    path,
                    record_count: table.record_count,
                    total: table.total,
                });
            }
        }

        Ok(written)
    }
}

fn create_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        ProcessorError::configuration(format!(
            "Failed to create output folder '{}': {}",
            dir.display(),
            e
        ))
    })
}

fn create_progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
