//! Parsing statistics and event log for a single invoice file
//!
//! The row scanner reports what it did through these types instead of
//! printing as it goes, so the caller decides how much of it to show.

use crate::models::{HeaderField, Record};

/// Why a row inside the table produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Description mentions a total or subtotal
    SummaryRow,
    /// Amount cell is empty
    MissingAmount,
    /// Amount cell holds text with letters in it
    NonNumericAmount,
    /// Amount cell could not be read as a decimal number
    UnparseableAmount,
    /// Amount is zero or negative
    NonPositiveAmount,
    /// Description has no three-digit plate
    MissingPlate,
}

impl SkipReason {
    pub fn description(&self) -> &'static str {
        match self {
            SkipReason::SummaryRow => "summary row",
            SkipReason::MissingAmount => "empty amount",
            SkipReason::NonNumericAmount => "non-numeric amount",
            SkipReason::UnparseableAmount => "unparseable amount",
            SkipReason::NonPositiveAmount => "amount not positive",
            SkipReason::MissingPlate => "no plate in description",
        }
    }
}

/// Something the parser observed while reading one file
#[derive(Debug, Clone, PartialEq)]
pub enum ParseEvent {
    HeaderFound { field: HeaderField, row: u32, col: u32 },
    HeaderMissing { field: HeaderField },
    RowAccepted { row: u32 },
    RowSkipped { row: u32, reason: SkipReason },
    /// Row cap reached; rows from `row` on were not read
    Truncated { row: u32 },
}

/// Overall result for one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Table located and scanned (possibly with zero records)
    Parsed,
    /// A mandatory header was not found; the file contributes nothing
    MissingHeaders(Vec<HeaderField>),
    /// The workbook could not be opened
    Unreadable(String),
}

/// Row counters for one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Rows visited below the header
    pub rows_scanned: usize,

    /// Rows whose description cell was empty
    pub blank_rows: usize,

    /// Rows turned into records
    pub records_emitted: usize,

    /// Non-blank rows dropped without a record
    pub rows_skipped: usize,

    /// Scan stopped at the row cap instead of at the end of the table
    pub truncated: bool,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of non-blank rows that became records, as a percentage
    pub fn success_rate(&self) -> f64 {
        let candidates = self.records_emitted + self.rows_skipped;
        if candidates == 0 {
            0.0
        } else {
            (self.records_emitted as f64 / candidates as f64) * 100.0
        }
    }
}

/// Parse report for one file, without its records
#[derive(Debug, Clone, PartialEq)]
pub struct FileParseReport {
    pub file_name: String,
    pub status: FileStatus,
    pub stats: ParseStats,
    pub events: Vec<ParseEvent>,
}

impl FileParseReport {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            status: FileStatus::Parsed,
            stats: ParseStats::new(),
            events: Vec::new(),
        }
    }

    pub fn unreadable(file_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            status: FileStatus::Unreadable(reason.into()),
            ..Self::new(file_name)
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.status == FileStatus::Parsed
    }

    /// Number of rows skipped for a given reason
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, ParseEvent::RowSkipped { reason: r, .. } if *r == reason))
            .count()
    }

    pub fn summary(&self) -> String {
        match &self.status {
            FileStatus::Parsed => format!(
                "{}: {} records from {} rows ({} skipped{})",
                self.file_name,
                self.stats.records_emitted,
                self.stats.rows_scanned,
                self.stats.rows_skipped,
                if self.stats.truncated { ", truncated" } else { "" }
            ),
            FileStatus::MissingHeaders(fields) => {
                let names: Vec<&str> = fields.iter().map(|f| f.name()).collect();
                format!(
                    "{}: table not found (missing {})",
                    self.file_name,
                    names.join(", ")
                )
            }
            FileStatus::Unreadable(reason) => {
                format!("{}: unreadable ({})", self.file_name, reason)
            }
        }
    }
}

/// Records and report produced for one file
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub records: Vec<Record>,
    pub report: FileParseReport,
}
