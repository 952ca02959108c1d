//! Integration tests for the processor module
//!
//! Tests the processing pipeline using in-memory invoice grids, so no real
//! workbook has to be written for most cases.


use crate::error::{ProcessorError, Result};
use crate::models::{CellValue, Grid};
use crate::processor::writer::ReportSink;
use crate::report::ReportTable;
use crate::workbook::WorkbookReader;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Row of the header line in test invoices
pub const HEADER_ROW: u32 = 10;

pub const DESCRIPTION_COL: u32 = 2;
pub const AMOUNT_COL: u32 = 8;

/// Invoice grid with a preamble, a typical header line and the given rows
pub fn invoice_grid(rows: &[(&str, CellValue)]) -> Grid {
    let mut grid = Grid::new()
        .with_cell(2, 2, "Счет на оплату № 118 от 30 сентября 2025 г.")
        .with_cell(4, 2, "Поставщик: ООО \"Транспортная компания\"")
        .with_cell(HEADER_ROW, 1, "№")
        .with_cell(HEADER_ROW, DESCRIPTION_COL, "Товары (работы, услуги)")
        .with_cell(HEADER_ROW, 5, "Кол-во")
        .with_cell(HEADER_ROW, 6, "Ед.")
        .with_cell(HEADER_ROW, 7, "Цена")
        .with_cell(HEADER_ROW, AMOUNT_COL, "Сумма");

    for (offset, (description, amount)) in (1u32..).zip(rows) {
        let row = HEADER_ROW + offset;
        grid.insert(row, 1, CellValue::from(offset as i32));
        grid.insert(row, DESCRIPTION_COL, CellValue::from(*description));
        grid.insert(row, AMOUNT_COL, amount.clone());
    }
    grid
}

/// Serves grids by file name; unknown names fail like a corrupt workbook
#[derive(Debug, Default)]
pub struct MemoryReader {
    grids: HashMap<String, Grid>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(mut self, file_name: &str, grid: Grid) -> Self {
        self.grids.insert(file_name.to_string(), grid);
        self
    }
}

impl WorkbookReader for MemoryReader {
    fn open(&self, path: &Path) -> Result<Grid> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.grids
            .get(&name)
            .cloned()
            .ok_or_else(|| ProcessorError::EmptyWorkbook {
                path: path.to_path_buf(),
            })
    }
}

/// Keeps written tables in memory, shared with the test body
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub written: Arc<Mutex<Vec<(PathBuf, ReportTable)>>>,
}

impl MemorySink {
    pub fn tables(&self) -> Vec<(PathBuf, ReportTable)> {
        self.written.lock().unwrap().clone()
    }
}

impl ReportSink for MemorySink {
    fn write(&mut self, table: &ReportTable, destination: &Path) -> Result<()> {
        self.written
            .lock()
            .unwrap()
            .push((destination.to_path_buf(), table.clone()));
        Ok(())
    }
}

/// Create empty placeholder files so discovery finds them
pub fn touch_files(dir: &Path, names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| {
            let path = dir.join(name);
            std::fs::write(&path, b"").unwrap();
            path
        })
        .collect()
}

pub fn shared(reader: MemoryReader) -> Arc<dyn WorkbookReader> {
    Arc::new(reader)
}
