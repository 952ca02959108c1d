//! Invoice Processor Library
//!
//! Extracts transport line items from free-form spreadsheet invoices and
//! turns them into per-vehicle and per-driver reports.
//!
//! This library provides tools for:
//! - Locating the billing table in a worksheet by its header vocabulary
//! - Extracting route, date, plate and driver from line-item descriptions
//! - Merging records from many invoices in a deterministic order
//! - Auditing the merged data for duplicates, gaps and unusual amounts
//! - Writing grouped `.xlsx` reports with exact decimal totals

pub mod audit;
pub mod config;
pub mod constants;
pub mod description;
pub mod error;
pub mod header;
pub mod models;
pub mod month;
pub mod processor;
pub mod report;
pub mod workbook;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use audit::{AuditIssue, AuditReport, IssueCategory, QualityAuditor};
pub use config::{ProcessorConfig, ScanLimits};
pub use error::{ProcessorError, Result};
pub use models::{CellValue, Dataset, Grid, HeaderField, HeaderMap, Record};
pub use processor::{InvoiceProcessor, RunOutcome, RunSummary};
pub use report::{ReportKind, ReportTable, build_reports};
pub use workbook::{CalamineReader, WorkbookReader};
