//! Per-vehicle and per-driver report tables.
//!
//! Groups the dataset by plate or by driver surname, orders each group by
//! its date text and appends a total row. The resulting [`ReportTable`] is
//! format-neutral; writing it to disk is the job of a
//! [`ReportSink`](crate::processor::writer::ReportSink).

use crate::constants::{REPORT_EXTENSION, UNSAFE_FILENAME_CHARS, columns};
use crate::models::Record;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt;

/// Grouping a report is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// One report per plate
    Vehicle,
    /// One report per driver surname
    Driver,
}

impl ReportKind {
    pub fn columns(&self) -> [&'static str; 4] {
        match self {
            ReportKind::Vehicle => [columns::DATE, columns::ROUTE, columns::DRIVER, columns::AMOUNT],
            ReportKind::Driver => [columns::DATE, columns::ROUTE, columns::PLATE, columns::AMOUNT],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ReportKind::Vehicle => "vehicle",
            ReportKind::Driver => "driver",
        }
    }

    /// Grouping key of a record; records without one get no report
    fn key_of<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self {
            ReportKind::Vehicle => record.plate.as_deref(),
            ReportKind::Driver => record.driver.as_deref(),
        }
    }

    /// Text of the third column, the one that differs between kinds
    fn counterpart<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            ReportKind::Vehicle => record.driver_display(),
            ReportKind::Driver => record.plate_display(),
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One cell of a report row
#[derive(Debug, Clone, PartialEq)]
pub enum ReportCell {
    Text(String),
    Amount(Decimal),
    Empty,
}

/// Rows of one report, total row last
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub kind: ReportKind,
    pub key: String,
    pub columns: [&'static str; 4],
    pub rows: Vec<Vec<ReportCell>>,
    pub record_count: usize,
    pub total: Decimal,
}

impl ReportTable {
    /// Rows taken from records, without the total row
    pub fn data_rows(&self) -> &[Vec<ReportCell>] {
        &self.rows[..self.record_count]
    }

    /// The synthetic total row
    pub fn total_row(&self) -> Option<&[ReportCell]> {
        self.rows.last().map(Vec::as_slice)
    }

    /// Output file name for a month label, e.g. `601 сентябрь.xlsx`
    pub fn file_name(&self, month: &str) -> String {
        format!("{} {}.{}", sanitize_file_stem(&self.key), month, REPORT_EXTENSION)
    }
}

/// Replace characters that are not allowed in file names with `_`
pub fn sanitize_file_stem(text: &str) -> String {
    text.chars()
        .map(|c| if UNSAFE_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Build one report per distinct key, in key order
pub fn build_reports(dataset: &[Record], kind: ReportKind) -> Vec<ReportTable> {
    let mut groups: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in dataset {
        if let Some(key) = kind.key_of(record) {
            groups.entry(key).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .map(|(key, records)| build_report(kind, key, records))
        .collect()
}

/// Build the report for one group of records
///
/// Rows are ordered by their date text as written (`DD.MM.YY`), which is not
/// calendar order across months. The sort is stable, so records with equal
/// dates keep their dataset order.
pub fn build_report(kind: ReportKind, key: &str, mut records: Vec<&Record>) -> ReportTable {
    records.sort_by(|a, b| a.date_display().cmp(b.date_display()));

    let total: Decimal = records.iter().map(|record| record.amount).sum();
    let record_count = records.len();

    let mut rows: Vec<Vec<ReportCell>> = records
        .iter()
        .map(|record| {
            vec![
                ReportCell::Text(record.date_display().to_string()),
                ReportCell::Text(record.route.clone()),
                ReportCell::Text(kind.counterpart(record).to_string()),
                ReportCell::Amount(record.amount),
            ]
        })
        .collect();

    rows.push(vec![
        ReportCell::Text(columns::TOTAL_LABEL.to_string()),
        ReportCell::Empty,
        ReportCell::Empty,
        ReportCell::Amount(total),
    ]);

    ReportTable {
        kind,
        key: key.to_string(),
        columns: kind.columns(),
        rows,
        record_count,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DATE_NOT_FOUND;
    use std::str::FromStr;

    fn record(date: Option<&str>, plate: Option<&str>, driver: Option<&str>, amount: &str) -> Record {
        Record {
            date: date.map(str::to_string),
            route: "Москва - Тула".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            plate: plate.map(str::to_string),
            driver: driver.map(str::to_string),
            source_file: "test.xlsx".to_string(),
            source_row: 1,
        }
    }

    fn first_column(table: &ReportTable) -> Vec<String> {
        table
            .data_rows()
            .iter()
            .map(|row| match &row[0] {
                ReportCell::Text(text) => text.clone(),
                other => panic!("unexpected cell {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_vehicle_reports_group_by_plate() {
        let dataset = vec![
            record(Some("06.09.25"), Some("601"), Some("Петров"), "5000"),
            record(Some("07.09.25"), Some("777"), Some("Петров"), "100"),
            record(Some("08.09.25"), Some("601"), Some("Сидоров"), "15000"),
        ];

        let reports = build_reports(&dataset, ReportKind::Vehicle);

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].key, "601");
        assert_eq!(reports[0].record_count, 2);
        assert_eq!(reports[0].rows.len(), 3);
        assert_eq!(reports[0].total, Decimal::from(20000));
        assert_eq!(
            reports[0].total_row().unwrap(),
            &[
                ReportCell::Text("ИТОГО:".to_string()),
                ReportCell::Empty,
                ReportCell::Empty,
                ReportCell::Amount(Decimal::from(20000)),
            ]
        );
        assert_eq!(reports[0].data_rows()[1][2], ReportCell::Text("Сидоров".to_string()));
    }

    #[test]
    fn test_driver_reports_skip_missing_driver() {
        let dataset = vec![
            record(Some("06.09.25"), Some("601"), None, "5000"),
            record(Some("07.09.25"), Some("601"), Some("Петров"), "100"),
        ];

        let reports = build_reports(&dataset, ReportKind::Driver);

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].key, "Петров");
        assert_eq!(reports[0].columns[2], columns::PLATE);
        assert_eq!(reports[0].data_rows()[0][2], ReportCell::Text("601".to_string()));
    }

    #[test]
    fn test_unplated_records_get_no_vehicle_report() {
        let dataset = vec![record(Some("06.09.25"), None, Some("Петров"), "5000")];
        assert!(build_reports(&dataset, ReportKind::Vehicle).is_empty());
        assert_eq!(build_reports(&dataset, ReportKind::Driver).len(), 1);
    }

    #[test]
    fn test_total_is_exact_decimal_sum() {
        let dataset = vec![
            record(Some("01.09.25"), Some("601"), None, "0.1"),
            record(Some("02.09.25"), Some("601"), None, "0.2"),
            record(Some("03.09.25"), Some("601"), None, "1234.56"),
        ];

        let reports = build_reports(&dataset, ReportKind::Vehicle);

        assert_eq!(reports[0].total, Decimal::from_str("1234.86").unwrap());
    }

    #[test]
    fn test_dates_sort_as_text() {
        let dataset = vec![
            record(Some("15.01.25"), Some("601"), None, "1"),
            record(None, Some("601"), None, "2"),
            record(Some("01.09.25"), Some("601"), None, "3"),
        ];

        let reports = build_reports(&dataset, ReportKind::Vehicle);

        assert_eq!(
            first_column(&reports[0]),
            vec!["01.09.25", "15.01.25", DATE_NOT_FOUND]
        );
    }

    #[test]
    fn test_equal_dates_keep_dataset_order() {
        let mut first = record(Some("01.09.25"), Some("601"), None, "1");
        first.route = "first".to_string();
        let mut second = record(Some("01.09.25"), Some("601"), None, "2");
        second.route = "second".to_string();

        let reports = build_reports(&[first, second], ReportKind::Vehicle);

        assert_eq!(
            reports[0].data_rows()[0][1],
            ReportCell::Text("first".to_string())
        );
    }

    #[test]
    fn test_file_name_sanitizes_key() {
        let dataset = vec![record(None, Some("601"), Some("Ив/ан?ов"), "1")];
        let reports = build_reports(&dataset, ReportKind::Driver);

        assert_eq!(reports[0].file_name("сентябрь"), "Ив_ан_ов сентябрь.xlsx");
        assert_eq!(sanitize_file_stem(r#"a<b>c:d"e\f|g*"#), "a_b_c_d_e_f_g_");
    }
}
