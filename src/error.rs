//! Error handling for invoice processing operations.
//!
//! Only pipeline-level failures live here. Problems confined to a single
//! row or a single file are reported through parse statistics and never
//! become an `Err`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read workbook {path}: {source}")]
    WorkbookRead {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {path} has no worksheets")]
    EmptyWorkbook { path: PathBuf },

    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    FilePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Ingestion task failed: {reason}")]
    TaskFailed { reason: String },
}

impl ProcessorError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProcessorError>;
