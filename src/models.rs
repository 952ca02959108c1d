//! Core data structures and types for invoice processing.
//!
//! Defines the in-memory cell grid handed over by the workbook reader,
//! header positions discovered in it, and the line-item records the
//! pipeline produces.

use crate::constants::{DATE_NOT_FOUND, DRIVER_NOT_FOUND, PLATE_UNKNOWN};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Computed value of a single non-empty cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// True for cells that carry no usable content
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(text) if text.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Number(value) => {
                if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{}", value)
                }
            }
            CellValue::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Sparse snapshot of one worksheet, addressed by 1-based row and column
///
/// Cells are kept in row-major order so iteration visits them the same way
/// a reader walking the sheet top to bottom, left to right would.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    cells: BTreeMap<(u32, u32), CellValue>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a cell value; blank values are not stored
    pub fn insert(&mut self, row: u32, col: u32, value: CellValue) {
        if value.is_blank() {
            self.cells.remove(&(row, col));
        } else {
            self.cells.insert((row, col), value);
        }
    }

    /// Builder-style variant of [`Grid::insert`]
    pub fn with_cell(mut self, row: u32, col: u32, value: impl Into<CellValue>) -> Self {
        self.insert(row, col, value.into());
        self
    }

    /// Build a grid from rows of cells, starting at row 1, column 1
    pub fn from_rows<R, V>(rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let mut grid = Self::new();
        for (row, cells) in (1u32..).zip(rows) {
            for (col, value) in (1u32..).zip(cells) {
                grid.insert(row, col, value.into());
            }
        }
        grid
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Non-empty cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &CellValue)> {
        self.cells.iter().map(|(&(row, col), value)| (row, col, value))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Row and column of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub row: u32,
    pub col: u32,
}

/// Semantic columns of a billing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeaderField {
    Description,
    Amount,
    Number,
    Quantity,
    Unit,
    Price,
}

impl HeaderField {
    pub fn name(&self) -> &'static str {
        match self {
            HeaderField::Description => "description",
            HeaderField::Amount => "amount",
            HeaderField::Number => "number",
            HeaderField::Quantity => "quantity",
            HeaderField::Unit => "unit",
            HeaderField::Price => "price",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header positions discovered in one worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderMap {
    positions: BTreeMap<HeaderField, CellPosition>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a header position, replacing any earlier one for the field
    pub fn set(&mut self, field: HeaderField, row: u32, col: u32) {
        self.positions.insert(field, CellPosition { row, col });
    }

    pub fn get(&self, field: HeaderField) -> Option<CellPosition> {
        self.positions.get(&field).copied()
    }

    pub fn contains(&self, field: HeaderField) -> bool {
        self.positions.contains_key(&field)
    }

    /// Lowest header row: the data region starts right below it
    pub fn header_row(&self) -> Option<u32> {
        self.positions.values().map(|pos| pos.row).max()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (HeaderField, CellPosition)> + '_ {
        self.positions.iter().map(|(&field, &pos)| (field, pos))
    }
}

/// One billed line item
///
/// Fields that could not be extracted are `None`; the display sentinels are
/// only applied when rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: Option<String>,
    pub route: String,
    pub amount: Decimal,
    pub plate: Option<String>,
    pub driver: Option<String>,
    pub source_file: String,
    pub source_row: u32,
}

impl Record {
    pub fn date_display(&self) -> &str {
        self.date.as_deref().unwrap_or(DATE_NOT_FOUND)
    }

    pub fn plate_display(&self) -> &str {
        self.plate.as_deref().unwrap_or(PLATE_UNKNOWN)
    }

    pub fn driver_display(&self) -> &str {
        self.driver.as_deref().unwrap_or(DRIVER_NOT_FOUND)
    }
}

/// All records of a run, in file order then row order
pub type Dataset = Vec<Record>;
