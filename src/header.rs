//! Billing table header discovery.
//!
//! Invoices are laid out by hand, so the table is found by its header text
//! rather than by fixed coordinates. Every non-empty cell is classified
//! against an ordered rule table; the first rule that matches decides the
//! cell's field, and a later cell matching the same field replaces the
//! earlier position.

use crate::constants::{
    HEADER_AMOUNT, HEADER_AMOUNT_WITH_VAT, HEADER_DESCRIPTION, HEADER_NUMBER,
    HEADER_NUMBER_MAX_COLUMN, HEADER_PRICE, HEADER_QUANTITY, HEADER_UNIT,
};
use crate::models::{Grid, HeaderField, HeaderMap};
use tracing::debug;

/// Text test applied to a trimmed cell value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeaderPattern {
    /// Cell text contains the needle
    Contains(&'static str),
    /// Cell text contains the needle but is not exactly the excluded text
    ContainsExcept {
        needle: &'static str,
        except: &'static str,
    },
    /// Cell text equals the value and the cell sits left of `max_col`
    ExactBeforeColumn { text: &'static str, max_col: u32 },
}

impl HeaderPattern {
    pub fn matches(&self, text: &str, col: u32) -> bool {
        match *self {
            HeaderPattern::Contains(needle) => text.contains(needle),
            HeaderPattern::ContainsExcept { needle, except } => {
                text.contains(needle) && text != except
            }
            HeaderPattern::ExactBeforeColumn { text: expected, max_col } => {
                text == expected && col < max_col
            }
        }
    }
}

/// One entry of the header rule table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderRule {
    pub field: HeaderField,
    pub pattern: HeaderPattern,
}

/// Header rules in precedence order
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: HeaderField::Description,
        pattern: HeaderPattern::Contains(HEADER_DESCRIPTION),
    },
    HeaderRule {
        field: HeaderField::Amount,
        pattern: HeaderPattern::ContainsExcept {
            needle: HEADER_AMOUNT,
            except: HEADER_AMOUNT_WITH_VAT,
        },
    },
    HeaderRule {
        field: HeaderField::Number,
        pattern: HeaderPattern::ExactBeforeColumn {
            text: HEADER_NUMBER,
            max_col: HEADER_NUMBER_MAX_COLUMN,
        },
    },
    HeaderRule {
        field: HeaderField::Quantity,
        pattern: HeaderPattern::Contains(HEADER_QUANTITY),
    },
    HeaderRule {
        field: HeaderField::Unit,
        pattern: HeaderPattern::Contains(HEADER_UNIT),
    },
    HeaderRule {
        field: HeaderField::Price,
        pattern: HeaderPattern::Contains(HEADER_PRICE),
    },
];

/// Classify one cell against a rule table, first match wins
pub fn classify_cell(rules: &[HeaderRule], text: &str, col: u32) -> Option<HeaderField> {
    let trimmed = text.trim();
    rules
        .iter()
        .find(|rule| rule.pattern.matches(trimmed, col))
        .map(|rule| rule.field)
}

/// Locate header positions in a grid using the standard rule table
pub fn scan_headers(grid: &Grid) -> HeaderMap {
    scan_headers_with(grid, HEADER_RULES)
}

/// Locate header positions in a grid using a custom rule table
pub fn scan_headers_with(grid: &Grid, rules: &[HeaderRule]) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for (row, col, value) in grid.iter() {
        let text = value.to_string();
        if let Some(field) = classify_cell(rules, &text, col) {
            debug!("Found '{}' header at row {}, column {}", field, row, col);
            headers.set(field, row, col);
        }
    }

    headers
}
