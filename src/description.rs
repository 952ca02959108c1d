//! Field extraction from free-text line-item descriptions.
//!
//! A typical description reads
//! `"Москва - Тула, рейс от 06.09.25, а/м 601, Петров П.П."`. Each field is
//! pulled out by its own pattern; a field that cannot be found is `None`
//! and does not stop the others from being extracted.
//!
//! The plate is a heuristic: the first three consecutive digits anywhere in
//! the text. Digits from dates, amounts or order numbers match just as well,
//! so a description without a plate but with such numbers yields a wrong
//! plate rather than none.

use regex::Regex;
use std::sync::LazyLock;

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"от\s+(\d{2}\.\d{2}\.\d{2})").expect("valid date pattern"));

static PLATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{3})").expect("valid plate pattern"));

static DRIVER_WITH_INITIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r",\s*([А-Я][а-я]+)\s+[А-Я]\.[А-Я]\.").expect("valid driver pattern")
});

static DRIVER_SURNAME_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([А-Я][а-я]+)").expect("valid surname pattern"));

/// Fields found in one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionFields {
    pub route: String,
    pub date: Option<String>,
    pub plate: Option<String>,
    pub driver: Option<String>,
}

/// Extract route, date, plate and driver surname from a description
pub fn extract_fields(description: &str) -> DescriptionFields {
    DescriptionFields {
        route: extract_route(description),
        date: extract_date(description),
        plate: extract_plate(description),
        driver: extract_driver(description),
    }
}

/// Text before the first comma, trimmed
pub fn extract_route(description: &str) -> String {
    description
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// `DD.MM.YY` following the word "от"
pub fn extract_date(description: &str) -> Option<String> {
    first_capture(&DATE_PATTERN, description)
}

/// First three consecutive digits
pub fn extract_plate(description: &str) -> Option<String> {
    first_capture(&PLATE_PATTERN, description)
}

/// Capitalized surname after a comma, preferring one followed by initials
pub fn extract_driver(description: &str) -> Option<String> {
    first_capture(&DRIVER_WITH_INITIALS, description)
        .or_else(|| first_capture(&DRIVER_SURNAME_ONLY, description))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
