//! Billing table row scanner
//!
//! Walks the rows below the header, turning each usable line item into a
//! [`Record`]. Rows that cannot be used are dropped with a [`SkipReason`];
//! nothing a single row contains can fail the file.

use super::stats::{FileOutcome, FileParseReport, FileStatus, ParseEvent, SkipReason};
use crate::config::ScanLimits;
use crate::constants::SUMMARY_KEYWORDS;
use crate::description::extract_fields;
use crate::header::scan_headers;
use crate::models::{CellValue, Grid, HeaderField, HeaderMap, Record};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Headers without which a file cannot be parsed
const REQUIRED_HEADERS: [HeaderField; 2] = [HeaderField::Description, HeaderField::Amount];

/// Row scanner for one billing table
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordParser {
    limits: ScanLimits,
}

impl RecordParser {
    pub fn new(limits: ScanLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ScanLimits {
        self.limits
    }

    /// Locate the table in a grid and parse its rows
    pub fn parse_grid(&self, grid: &Grid, source_file: &str) -> FileOutcome {
        let headers = scan_headers(grid);
        self.parse_table(grid, &headers, source_file)
    }

    /// Parse rows below already-located headers
    pub fn parse_table(&self, grid: &Grid, headers: &HeaderMap, source_file: &str) -> FileOutcome {
        let mut report = FileParseReport::new(source_file);
        let mut records = Vec::new();

        for (field, pos) in headers.iter() {
            report.events.push(ParseEvent::HeaderFound {
                field,
                row: pos.row,
                col: pos.col,
            });
        }

        let missing: Vec<HeaderField> = REQUIRED_HEADERS
            .into_iter()
            .filter(|field| !headers.contains(*field))
            .collect();

        let (Some(description_pos), Some(amount_pos), Some(header_row)) = (
            headers.get(HeaderField::Description),
            headers.get(HeaderField::Amount),
            headers.header_row(),
        ) else {
            warn!("{}: billing table structure not found", source_file);
            for field in &missing {
                report
                    .events
                    .push(ParseEvent::HeaderMissing { field: *field });
            }
            report.status = FileStatus::MissingHeaders(missing);
            return FileOutcome { records, report };
        };

        debug!(
            "{}: data starts at row {}, description column {}, amount column {}",
            source_file,
            header_row + 1,
            description_pos.col,
            amount_pos.col
        );

        let last_row = header_row.saturating_add(self.limits.max_scan_rows);
        let mut row = header_row + 1;
        let mut empty_run = 0;

        while empty_run < self.limits.max_empty_rows {
            if row > last_row {
                warn!(
                    "{}: stopped after {} rows below the header",
                    source_file, self.limits.max_scan_rows
                );
                report.stats.truncated = true;
                report.events.push(ParseEvent::Truncated { row });
                break;
            }

            report.stats.rows_scanned += 1;

            let Some(description) = grid
                .cell(row, description_pos.col)
                .filter(|value| !value.is_blank())
            else {
                empty_run += 1;
                report.stats.blank_rows += 1;
                row += 1;
                continue;
            };
            empty_run = 0;

            match self.parse_row(grid, row, amount_pos.col, &description.to_string(), source_file)
            {
                Ok(record) => {
                    debug!(
                        "{} row {}: {} | {} | {} | {}",
                        source_file,
                        row,
                        record.date_display(),
                        record.plate_display(),
                        record.driver_display(),
                        record.amount
                    );
                    report.events.push(ParseEvent::RowAccepted { row });
                    report.stats.records_emitted += 1;
                    records.push(record);
                }
                Err(reason) => {
                    debug!("{} row {} skipped: {}", source_file, row, reason.description());
                    report.events.push(ParseEvent::RowSkipped { row, reason });
                    report.stats.rows_skipped += 1;
                }
            }

            row += 1;
        }

        info!("{}: {} records", source_file, records.len());
        FileOutcome { records, report }
    }

    fn parse_row(
        &self,
        grid: &Grid,
        row: u32,
        amount_col: u32,
        description: &str,
        source_file: &str,
    ) -> Result<Record, SkipReason> {
        if is_summary_row(description) {
            return Err(SkipReason::SummaryRow);
        }

        let amount_cell = grid.cell(row, amount_col).ok_or(SkipReason::MissingAmount)?;
        let amount = parse_amount(amount_cell)?;

        let fields = extract_fields(description);

        if amount <= Decimal::ZERO {
            return Err(SkipReason::NonPositiveAmount);
        }
        if fields.plate.is_none() && !self.limits.keep_unplated_rows {
            return Err(SkipReason::MissingPlate);
        }

        Ok(Record {
            date: fields.date,
            route: fields.route,
            amount,
            plate: fields.plate,
            driver: fields.driver,
            source_file: source_file.to_string(),
            source_row: row,
        })
    }
}

/// True when a description names a total or subtotal line
pub fn is_summary_row(description: &str) -> bool {
    let lowered = description.to_lowercase();
    SUMMARY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Strip digit-group spaces and turn a decimal comma into a point
pub fn normalize_amount_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Read an amount cell as an exact decimal
pub fn parse_amount(value: &CellValue) -> Result<Decimal, SkipReason> {
    match value {
        CellValue::Number(number) => {
            if !number.is_finite() {
                return Err(SkipReason::UnparseableAmount);
            }
            // Shortest round-trip form, so 1234.56 stays 1234.56
            number
                .to_string()
                .parse::<Decimal>()
                .map_err(|_| SkipReason::UnparseableAmount)
        }
        CellValue::Text(text) => {
            let normalized = normalize_amount_text(text);
            if normalized.chars().any(char::is_alphabetic) {
                return Err(SkipReason::NonNumericAmount);
            }
            normalized
                .parse::<Decimal>()
                .map_err(|_| SkipReason::UnparseableAmount)
        }
        CellValue::Bool(_) => Err(SkipReason::NonNumericAmount),
    }
}
