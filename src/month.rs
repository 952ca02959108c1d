//! Report month detection from input file names.
//!
//! The month label ends up in every report file name. It is taken from the
//! first input file whose name mentions a month, either by its Russian name
//! or as a two-digit number right before the extension.

use crate::constants::MONTH_NAMES;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static NUMERIC_MONTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})\.?xlsx").expect("valid month pattern"));

/// Month name for a 1-based month number
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Month mentioned in a single file name
pub fn month_from_file_name(file_name: &str) -> Option<&'static str> {
    let lowered = file_name.to_lowercase();

    if let Some(name) = MONTH_NAMES.iter().copied().find(|name| lowered.contains(name)) {
        return Some(name);
    }

    let caps = NUMERIC_MONTH.captures(&lowered)?;
    let number: u32 = caps.get(1)?.as_str().parse().ok()?;
    month_name(number)
}

/// Detect the report month, falling back to the month of `today`
pub fn detect_month<S: AsRef<str>>(file_names: &[S], today: NaiveDate) -> String {
    for file_name in file_names {
        if let Some(name) = month_from_file_name(file_name.as_ref()) {
            debug!("Month '{}' detected from {}", name, file_name.as_ref());
            return name.to_string();
        }
    }

    let fallback = month_name(today.month()).unwrap_or("текущий_месяц");
    debug!("No month in file names, using current month '{}'", fallback);
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_month_name_bounds() {
        assert_eq!(month_name(1), Some("январь"));
        assert_eq!(month_name(12), Some("декабрь"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
    }

    #[test]
    fn test_russian_month_name_in_file() {
        assert_eq!(month_from_file_name("Счет СЕНТЯБРЬ 2025.xlsx"), Some("сентябрь"));
    }

    #[test]
    fn test_numeric_month_before_extension() {
        assert_eq!(month_from_file_name("invoice_2025_09.xlsx"), Some("сентябрь"));
        assert_eq!(month_from_file_name("invoice 11xlsx"), Some("ноябрь"));
        assert_eq!(month_from_file_name("invoice_13.xlsx"), None);
        assert_eq!(month_from_file_name("invoice.xlsx"), None);
    }

    #[test]
    fn test_first_file_with_month_wins() {
        let files = ["acts.xlsx", "счет_октябрь.xlsx", "счет_05.xlsx"];
        assert_eq!(detect_month(&files, today()), "октябрь");
    }

    #[test]
    fn test_fallback_to_current_month() {
        let files = ["acts.xlsx", "invoice.xlsx"];
        assert_eq!(detect_month(&files, today()), "март");

        let none: [&str; 0] = [];
        assert_eq!(detect_month(&none, today()), "март");
    }
}
