//! Workbook reading.
//!
//! The pipeline works on [`Grid`] snapshots and never touches spreadsheet
//! files directly. [`CalamineReader`] produces those snapshots from real
//! workbooks; tests substitute in-memory readers.

use crate::error::{ProcessorError, Result};
use crate::models::{CellValue, Grid};
use calamine::{Data, Reader, open_workbook_auto};
use std::path::Path;
use tracing::debug;

/// Source of worksheet grids
pub trait WorkbookReader: Send + Sync {
    /// Read the computed cell values of the workbook's first worksheet
    fn open(&self, path: &Path) -> Result<Grid>;
}

/// Reads `.xlsx`, `.xlsm`, `.xls` and `.ods` files through calamine
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl WorkbookReader for CalamineReader {
    fn open(&self, path: &Path) -> Result<Grid> {
        let mut workbook =
            open_workbook_auto(path).map_err(|source| ProcessorError::WorkbookRead {
                path: path.to_path_buf(),
                source,
            })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ProcessorError::EmptyWorkbook {
                path: path.to_path_buf(),
            })?
            .map_err(|source| ProcessorError::WorkbookRead {
                path: path.to_path_buf(),
                source,
            })?;

        let mut grid = Grid::new();
        let Some((start_row, start_col)) = range.start() else {
            debug!("First worksheet of {} is empty", path.display());
            return Ok(grid);
        };

        for (row, col, data) in range.used_cells() {
            if let Some(value) = convert_cell(data) {
                // Range offsets are 0-based and relative to the first used cell
                let abs_row = start_row + row as u32 + 1;
                let abs_col = start_col + col as u32 + 1;
                grid.insert(abs_row, abs_col, value);
            }
        }

        debug!("Read {} cells from {}", grid.len(), path.display());
        Ok(grid)
    }
}

/// Convert a calamine cell into a grid value
pub fn convert_cell(data: &Data) -> Option<CellValue> {
    match data {
        Data::Empty => None,
        Data::String(text) => Some(CellValue::Text(text.clone())),
        Data::Float(value) => Some(CellValue::Number(*value)),
        Data::Int(value) => Some(CellValue::Number(*value as f64)),
        Data::Bool(value) => Some(CellValue::Bool(*value)),
        other => Some(CellValue::Text(other.to_string())),
    }
}
