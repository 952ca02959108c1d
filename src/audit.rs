//! Data quality audit over the merged dataset.
//!
//! Findings are informational: they are shown to the operator and never
//! stop report generation. Checks run in a fixed order (duplicates, missing
//! date, missing driver, missing plate, amount outliers) and every issue
//! points back at the records it concerns by dataset index.

use crate::constants::DEFAULT_OUTLIER_SIGMA;
use crate::models::Record;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use tracing::{debug, info};

/// Route text longer than this is shortened in issue messages
const ROUTE_PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IssueCategory {
    Duplicate,
    MissingDate,
    MissingDriver,
    MissingPlate,
    AmountOutlier,
}

impl IssueCategory {
    pub const ALL: [IssueCategory; 5] = [
        IssueCategory::Duplicate,
        IssueCategory::MissingDate,
        IssueCategory::MissingDriver,
        IssueCategory::MissingPlate,
        IssueCategory::AmountOutlier,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IssueCategory::Duplicate => "duplicate",
            IssueCategory::MissingDate => "missing_date",
            IssueCategory::MissingDriver => "missing_driver",
            IssueCategory::MissingPlate => "missing_plate",
            IssueCategory::AmountOutlier => "amount_outlier",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One finding about one record
#[derive(Debug, Clone, PartialEq)]
pub struct AuditIssue {
    pub category: IssueCategory,
    pub message: String,
    /// Dataset indices: the offending record first, then any related ones
    pub records: Vec<usize>,
}

/// Mean and spread used for outlier detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmountStats {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
}

impl AmountStats {
    /// Sample statistics over the amounts; `None` below two values
    pub fn compute(amounts: &[f64], sigma: f64) -> Option<Self> {
        let n = amounts.len();
        if n < 2 {
            return None;
        }

        let mean = amounts.iter().sum::<f64>() / n as f64;
        let variance = amounts.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        let std_dev = variance.sqrt();

        Some(Self {
            mean,
            std_dev,
            threshold: mean + sigma * std_dev,
        })
    }
}

/// All findings of one audit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub issues: Vec<AuditIssue>,
    pub amount_stats: Option<AmountStats>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, category: IssueCategory) -> usize {
        self.by_category(category).count()
    }

    pub fn by_category(&self, category: IssueCategory) -> impl Iterator<Item = &AuditIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.category == category)
    }

    /// One line per category that has findings
    pub fn summary_lines(&self) -> Vec<String> {
        IssueCategory::ALL
            .iter()
            .filter_map(|&category| {
                let count = self.count(category);
                if count == 0 {
                    return None;
                }
                let line = match category {
                    IssueCategory::Duplicate => format!("{} duplicate records", count),
                    IssueCategory::MissingDate => format!("{} records without a date", count),
                    IssueCategory::MissingDriver => {
                        format!("{} records without a driver surname", count)
                    }
                    IssueCategory::MissingPlate => format!("{} records without a plate", count),
                    IssueCategory::AmountOutlier => match self.amount_stats {
                        Some(stats) => format!(
                            "{} unusually large amounts (above {:.0})",
                            count, stats.threshold
                        ),
                        None => format!("{} unusually large amounts", count),
                    },
                };
                Some(line)
            })
            .collect()
    }
}

/// Runs the quality checks over a dataset
#[derive(Debug, Clone, Copy)]
pub struct QualityAuditor {
    outlier_sigma: f64,
}

impl Default for QualityAuditor {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_SIGMA)
    }
}

impl QualityAuditor {
    pub fn new(outlier_sigma: f64) -> Self {
        Self { outlier_sigma }
    }

    pub fn audit(&self, dataset: &[Record]) -> AuditReport {
        let mut report = AuditReport::default();

        find_duplicates(dataset, &mut report.issues);

        for (index, record) in dataset.iter().enumerate() {
            if record.date.is_none() {
                report.issues.push(AuditIssue {
                    category: IssueCategory::MissingDate,
                    message: format!(
                        "No date: {} | {} | {}",
                        route_preview(&record.route),
                        record.driver_display(),
                        record.amount
                    ),
                    records: vec![index],
                });
            }
        }

        for (index, record) in dataset.iter().enumerate() {
            if record.driver.is_none() {
                report.issues.push(AuditIssue {
                    category: IssueCategory::MissingDriver,
                    message: format!(
                        "No driver: {} | {} | {} | {}",
                        record.date_display(),
                        route_preview(&record.route),
                        record.plate_display(),
                        record.amount
                    ),
                    records: vec![index],
                });
            }
        }

        for (index, record) in dataset.iter().enumerate() {
            if record.plate.is_none() {
                report.issues.push(AuditIssue {
                    category: IssueCategory::MissingPlate,
                    message: format!(
                        "No plate: {} | {} | {} | {}",
                        record.date_display(),
                        route_preview(&record.route),
                        record.driver_display(),
                        record.amount
                    ),
                    records: vec![index],
                });
            }
        }

        report.amount_stats = self.find_outliers(dataset, &mut report.issues);

        if report.is_clean() {
            info!("Audit found no data quality issues");
        } else {
            info!("Audit found {} data quality issues", report.issues.len());
        }
        report
    }

    fn find_outliers(&self, dataset: &[Record], issues: &mut Vec<AuditIssue>) -> Option<AmountStats> {
        let amounts: Vec<f64> = dataset
            .iter()
            .map(|record| record.amount.to_f64().unwrap_or(f64::NAN))
            .collect();

        let Some(stats) = AmountStats::compute(&amounts, self.outlier_sigma) else {
            debug!("Outlier check skipped for {} records", dataset.len());
            return None;
        };
        debug!(
            "Amount mean {:.2}, std dev {:.2}, threshold {:.2}",
            stats.mean, stats.std_dev, stats.threshold
        );

        for (index, (record, amount)) in dataset.iter().zip(&amounts).enumerate() {
            if *amount > stats.threshold {
                issues.push(AuditIssue {
                    category: IssueCategory::AmountOutlier,
                    message: format!(
                        "Unusual amount: {} | {} | {} | {} (mean {:.0})",
                        record.date_display(),
                        route_preview(&record.route),
                        record.driver_display(),
                        record.amount,
                        stats.mean
                    ),
                    records: vec![index],
                });
            }
        }

        Some(stats)
    }
}

type RecordKey<'a> = (
    Option<&'a str>,
    &'a str,
    Decimal,
    Option<&'a str>,
    Option<&'a str>,
    &'a str,
    u32,
);

/// Every field of the record, provenance included
fn record_key(record: &Record) -> RecordKey<'_> {
    (
        record.date.as_deref(),
        record.route.as_str(),
        record.amount,
        record.plate.as_deref(),
        record.driver.as_deref(),
        record.source_file.as_str(),
        record.source_row,
    )
}

/// Every repeat of an earlier record is one issue; the first occurrence is not
fn find_duplicates(dataset: &[Record], issues: &mut Vec<AuditIssue>) {
    let mut first_seen: HashMap<RecordKey<'_>, usize> = HashMap::new();

    for (index, record) in dataset.iter().enumerate() {
        match first_seen.entry(record_key(record)) {
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
            Entry::Occupied(entry) => {
                let first = *entry.get();
                issues.push(AuditIssue {
                    category: IssueCategory::Duplicate,
                    message: format!(
                        "Duplicate: {} | {} | {} | {} ({} row {}, first seen in {} row {})",
                        record.date_display(),
                        route_preview(&record.route),
                        record.driver_display(),
                        record.amount,
                        record.source_file,
                        record.source_row,
                        dataset[first].source_file,
                        dataset[first].source_row
                    ),
                    records: vec![index, first],
                });
            }
        }
    }
}

fn route_preview(route: &str) -> String {
    if route.chars().count() > ROUTE_PREVIEW_CHARS {
        let head: String = route.chars().take(ROUTE_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        route.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(plate: &str, driver: Option<&str>, amount: i64) -> Record {
        Record {
            date: Some("06.09.25".to_string()),
            route: "Москва - Тула".to_string(),
            amount: Decimal::from(amount),
            plate: Some(plate.to_string()),
            driver: driver.map(str::to_string),
            source_file: "a.xlsx".to_string(),
            source_row: 1,
        }
    }

    #[test]
    fn test_clean_dataset() {
        let dataset = vec![
            record("601", Some("Петров"), 5000),
            record("601", Some("Сидоров"), 15000),
        ];
        let report = QualityAuditor::default().audit(&dataset);

        assert!(report.is_clean());
        assert!(report.summary_lines().is_empty());
        assert!(report.amount_stats.is_some());
    }

    #[test]
    fn test_duplicates_report_each_repeat() {
        let dataset = vec![
            record("601", Some("Петров"), 5000),
            record("601", Some("Петров"), 5000),
            record("601", Some("Петров"), 5000),
        ];

        let report = QualityAuditor::default().audit(&dataset);
        let duplicates: Vec<&AuditIssue> = report.by_category(IssueCategory::Duplicate).collect();

        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].records, vec![1, 0]);
        assert_eq!(duplicates[1].records, vec![2, 0]);
    }

    #[test]
    fn test_same_content_from_other_rows_is_not_duplicate() {
        let mut other_file = record("601", Some("Петров"), 5000);
        other_file.source_file = "b.xlsx".to_string();
        other_file.source_row = 14;
        let mut other_row = record("601", Some("Петров"), 5000);
        other_row.source_row = 11;
        let dataset = vec![record("601", Some("Петров"), 5000), other_file, other_row];

        let report = QualityAuditor::default().audit(&dataset);

        assert_eq!(report.count(IssueCategory::Duplicate), 0);
    }

    #[test]
    fn test_missing_fields() {
        let mut no_date = record("601", Some("Петров"), 5000);
        no_date.date = None;
        let mut no_plate = record("601", Some("Иванов"), 7000);
        no_plate.plate = None;
        let dataset = vec![no_date, record("777", None, 6000), no_plate];

        let report = QualityAuditor::default().audit(&dataset);

        assert_eq!(report.count(IssueCategory::MissingDate), 1);
        assert_eq!(report.count(IssueCategory::MissingDriver), 1);
        assert_eq!(report.count(IssueCategory::MissingPlate), 1);
        assert_eq!(report.issues[0].category, IssueCategory::MissingDate);
        assert_eq!(report.issues[1].records, vec![1]);
        assert!(report.issues[2].message.starts_with("No plate"));
    }

    #[test]
    fn test_single_outlier() {
        let mut dataset = vec![
            record("601", Some("Петров"), 5000),
            record("601", Some("Сидоров"), 15000),
        ];
        for driver in ["Иванов", "Козлов", "Орлов", "Волков", "Зайцев"] {
            dataset.push(record("777", Some(driver), 5000));
        }
        dataset.push(record("777", Some("Лисин"), 100000));

        let report = QualityAuditor::default().audit(&dataset);
        let stats = report.amount_stats.unwrap();

        assert_eq!(report.count(IssueCategory::AmountOutlier), 1);
        assert_eq!(report.issues.last().unwrap().records, vec![7]);
        assert_eq!(stats.mean, 18125.0);
        assert!((stats.threshold - 84659.0).abs() < 1.0);
        assert_eq!(
            report.summary_lines(),
            vec!["1 unusually large amounts (above 84659)".to_string()]
        );
    }

    #[test]
    fn test_outlier_check_needs_two_records() {
        let report = QualityAuditor::default().audit(&[record("601", Some("Петров"), 5000)]);
        assert!(report.amount_stats.is_none());
        assert!(report.is_clean());

        let report = QualityAuditor::default().audit(&[]);
        assert!(report.is_clean());
    }

    #[test]
    fn test_equal_amounts_are_not_outliers() {
        let dataset: Vec<Record> = ["Петров", "Сидоров", "Иванов"]
            .into_iter()
            .map(|driver| record("601", Some(driver), 5000))
            .collect();

        let report = QualityAuditor::new(0.0).audit(&dataset);
        assert_eq!(report.count(IssueCategory::AmountOutlier), 0);
    }

    #[test]
    fn test_route_preview_truncates_by_chars() {
        let long = "Москва - Санкт-Петербург - Великий Новгород";
        let preview = route_preview(long);
        assert_eq!(preview.chars().count(), ROUTE_PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
        assert_eq!(route_preview("Тула"), "Тула");
    }
}
