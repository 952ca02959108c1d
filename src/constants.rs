//! Application constants for the invoice processor
//!
//! Header vocabulary, display sentinels, scan limits and report layout
//! values shared across the pipeline.

// =============================================================================
// Header Vocabulary
// =============================================================================

/// Header text of the line-item description column
pub const HEADER_DESCRIPTION: &str = "Товары (работы, услуги)";

/// Header text fragment of the amount column
pub const HEADER_AMOUNT: &str = "Сумма";

/// Amount-like header that must not be taken as the amount column
pub const HEADER_AMOUNT_WITH_VAT: &str = "Сумма с НДС";

/// Header text of the line number column (exact match only)
pub const HEADER_NUMBER: &str = "№";

/// Line number headers further right than this column are ignored
pub const HEADER_NUMBER_MAX_COLUMN: u32 = 10;

pub const HEADER_QUANTITY: &str = "Кол-во";
pub const HEADER_UNIT: &str = "Ед.";
pub const HEADER_PRICE: &str = "Цена";

/// Description fragments marking a summary or total row (matched lower-cased)
pub const SUMMARY_KEYWORDS: &[&str] = &["итого", "всего", "итог", "сумма"];

// =============================================================================
// Display Sentinels
// =============================================================================

/// Rendered in place of a date that could not be extracted
pub const DATE_NOT_FOUND: &str = "date not found";

/// Rendered in place of a driver surname that could not be extracted
pub const DRIVER_NOT_FOUND: &str = "surname not found";

/// Rendered in place of a plate that could not be extracted
pub const PLATE_UNKNOWN: &str = "unknown";

// =============================================================================
// Scan Limits
// =============================================================================

/// Consecutive blank description cells that end a table
pub const DEFAULT_MAX_EMPTY_ROWS: usize = 5;

/// Rows scanned past the header before the scan is truncated
pub const DEFAULT_MAX_SCAN_ROWS: u32 = 1000;

/// Amounts above mean + sigma * stddev are reported as outliers
pub const DEFAULT_OUTLIER_SIGMA: f64 = 2.0;

// =============================================================================
// Input / Output Layout
// =============================================================================

pub const DEFAULT_FILE_PATTERN: &str = "*.xlsx";

/// File names containing this character are editor lock or temp files
pub const LOCK_FILE_MARKER: char = '~';

pub const DEFAULT_VEHICLE_FOLDER: &str = "by-vehicle";
pub const DEFAULT_DRIVER_FOLDER: &str = "by-driver";
pub const REPORT_EXTENSION: &str = "xlsx";
pub const REPORT_SHEET_NAME: &str = "Отчет";

/// Characters replaced with `_` when a driver surname becomes a file name
pub const UNSAFE_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Report column headers
pub mod columns {
    pub const DATE: &str = "Дата";
    pub const ROUTE: &str = "Маршрут";
    pub const DRIVER: &str = "Водитель";
    pub const PLATE: &str = "Гос_номер";
    pub const AMOUNT: &str = "Стоимость";

    /// Label written in the first column of the total row
    pub const TOTAL_LABEL: &str = "ИТОГО:";

    pub const DEFAULT_WIDTH: f64 = 15.0;

    /// Column width hint for a header, falling back to the default width
    pub fn width(header: &str) -> f64 {
        match header {
            DATE => 12.0,
            ROUTE => 30.0,
            DRIVER => 15.0,
            PLATE => 12.0,
            AMOUNT => 15.0,
            _ => DEFAULT_WIDTH,
        }
    }
}

// =============================================================================
// Month Names
// =============================================================================

/// Month labels used in report file names, indexed by month number - 1
pub const MONTH_NAMES: [&str; 12] = [
    "январь",
    "февраль",
    "март",
    "апрель",
    "май",
    "июнь",
    "июль",
    "август",
    "сентябрь",
    "октябрь",
    "ноябрь",
    "декабрь",
];
