//! Multi-file ingestion
//!
//! Applies the record parser to every invoice file and merges the results
//! into one dataset. Files are independent: a file that cannot be read or
//! has no recognizable table contributes zero records and the run goes on.
//! Files may be parsed concurrently, but results are always merged in the
//! order the files were given.

use super::discovery::display_name;
use super::record_parser::RecordParser;
use super::stats::{FileOutcome, FileParseReport};
use crate::error::{ProcessorError, Result};
use crate::models::Dataset;
use crate::workbook::WorkbookReader;
use futures::stream::{self, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;
use tracing::{info, warn};

/// Merged result of a set of files
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// All records, in file order then row order
    pub dataset: Dataset,
    /// One report per input file, in input order
    pub reports: Vec<FileParseReport>,
}

impl IngestResult {
    /// Merge per-file outcomes, keeping their order
    pub fn merge(outcomes: impl IntoIterator<Item = FileOutcome>) -> Self {
        let mut result = Self::default();
        for outcome in outcomes {
            result.dataset.extend(outcome.records);
            result.reports.push(outcome.report);
        }
        result
    }

    /// Files whose table was located and scanned
    pub fn files_parsed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_parsed()).count()
    }

    pub fn record_count(&self) -> usize {
        self.dataset.len()
    }
}

/// Applies a [`RecordParser`] to every file of a run
#[derive(Clone)]
pub struct FileIngestor {
    reader: Arc<dyn WorkbookReader>,
    parser: RecordParser,
}

impl std::fmt::Debug for FileIngestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIngestor")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}

impl FileIngestor {
    pub fn new(reader: Arc<dyn WorkbookReader>, parser: RecordParser) -> Self {
        Self { reader, parser }
    }

    /// Read and parse one file; failures become an unreadable report
    pub fn parse_file(&self, path: &Path) -> FileOutcome {
        let file_name = display_name(path);
        info!("Processing file: {}", file_name);

        match self.reader.open(path) {
            Ok(grid) => self.parser.parse_grid(&grid, &file_name),
            Err(e) => {
                warn!("Skipping {}: {}", file_name, e);
                FileOutcome {
                    records: Vec::new(),
                    report: FileParseReport::unreadable(file_name, e.to_string()),
                }
            }
        }
    }

    /// Parse files one after another
    pub fn ingest_sequential(&self, files: &[PathBuf]) -> IngestResult {
        IngestResult::merge(files.iter().map(|path| self.parse_file(path)))
    }

    /// Parse files with up to `workers` running at once
    ///
    /// The merged dataset is the same as [`FileIngestor::ingest_sequential`]
    /// produces for any worker count.
    pub async fn ingest(
        &self,
        files: &[PathBuf],
        workers: usize,
        progress_bar: Option<&ProgressBar>,
    ) -> Result<IngestResult> {
        let workers = workers.max(1);

        let outcomes: Vec<FileOutcome> = stream::iter(files.iter().cloned())
            .map(|path| {
                let ingestor = self.clone();
                task::spawn_blocking(move || ingestor.parse_file(&path))
            })
            .buffered(workers)
            .map_err(|e| ProcessorError::TaskFailed {
                reason: e.to_string(),
            })
            .inspect_ok(|outcome| {
                if let Some(pb) = progress_bar {
                    pb.inc(1);
                    pb.set_message(outcome.report.file_name.clone());
                }
            })
            .try_collect()
            .await?;

        let result = IngestResult::merge(outcomes);
        info!(
            "Ingested {} records from {} of {} files",
            result.record_count(),
            result.files_parsed(),
            files.len()
        );
        Ok(result)
    }
}
