//! Report writing module
//!
//! Writes [`ReportTable`]s as single-sheet `.xlsx` workbooks: a bold header
//! line, one row per record and the total row, with amounts stored as
//! numbers so the sheet stays summable.

use crate::constants::{REPORT_SHEET_NAME, columns};
use crate::error::{ProcessorError, Result};
use crate::report::{ReportCell, ReportTable};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::debug;

/// Destination for finished report tables
pub trait ReportSink: Send {
    fn write(&mut self, table: &ReportTable, destination: &Path) -> Result<()>;
}

/// Writes reports through rust_xlsxwriter
#[derive(Debug, Clone)]
pub struct XlsxReportWriter {
    sheet_name: String,
}

impl Default for XlsxReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxReportWriter {
    pub fn new() -> Self {
        Self {
            sheet_name: REPORT_SHEET_NAME.to_string(),
        }
    }

    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    fn fill_worksheet(&self, worksheet: &mut Worksheet, table: &ReportTable) -> std::result::Result<(), XlsxError> {
        worksheet.set_name(&self.sheet_name)?;

        let header_format = Format::new().set_bold();
        let amount_format = Format::new().set_num_format("0.00");

        for (col, header) in (0u16..).zip(table.columns.iter()) {
            worksheet.write_string_with_format(0, col, *header, &header_format)?;
            worksheet.set_column_width(col, columns::width(header))?;
        }

        // The total row is plain like the data rows; only the header is bold
        for (index, row) in table.rows.iter().enumerate() {
            let sheet_row = index as u32 + 1;
            for (col, cell) in (0u16..).zip(row.iter()) {
                match cell {
                    ReportCell::Text(text) => {
                        worksheet.write_string(sheet_row, col, text)?;
                    }
                    ReportCell::Amount(amount) => {
                        match amount.to_f64() {
                            Some(value) => worksheet.write_number_with_format(
                                sheet_row,
                                col,
                                value,
                                &amount_format,
                            )?,
                            None => worksheet.write_string(sheet_row, col, amount.to_string())?,
                        };
                    }
                    ReportCell::Empty => {}
                }
            }
        }

        Ok(())
    }
}

impl ReportSink for XlsxReportWriter {
    fn write(&mut self, table: &ReportTable, destination: &Path) -> Result<()> {
        let report_error = |source| ProcessorError::ReportWrite {
            path: destination.to_path_buf(),
            source,
        };

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        self.fill_worksheet(worksheet, table).map_err(report_error)?;
        workbook.save(destination).map_err(report_error)?;

        debug!(
            "Wrote {} report {} ({} rows)",
            table.kind,
            destination.display(),
            table.record_count
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use crate::report::{ReportKind, build_reports};
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use rust_decimal::Decimal;
    use std::fs::File;
    use std::io::Read;
    use tempfile::TempDir;
    use zip::ZipArchive;

    fn sample_dataset() -> Vec<Record> {
        vec![
            Record {
                date: Some("06.09.25".to_string()),
                route: "Москва - Тула".to_string(),
                amount: Decimal::new(500050, 2),
                plate: Some("601".to_string()),
                driver: Some("Петров".to_string()),
                source_file: "a.xlsx".to_string(),
                source_row: 5,
            },
            Record {
                date: None,
                route: "Тула - Орел".to_string(),
                amount: Decimal::from(15000),
                plate: Some("601".to_string()),
                driver: None,
                source_file: "b.xlsx".to_string(),
                source_row: 7,
            },
        ]
    }

    #[test]
    fn test_write_vehicle_report() {
        let temp_dir = TempDir::new().unwrap();
        let tables = build_reports(&sample_dataset(), ReportKind::Vehicle);
        let path = temp_dir.path().join(tables[0].file_name("сентябрь"));

        XlsxReportWriter::new().write(&tables[0], &path).unwrap();

        let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
        assert_eq!(workbook.sheet_names(), vec!["Отчет".to_string()]);
        let range = workbook.worksheet_range("Отчет").unwrap();

        assert_eq!(range.height(), 4);
        assert_eq!(range.get((0, 0)), Some(&Data::String("Дата".to_string())));
        assert_eq!(range.get((0, 2)), Some(&Data::String("Водитель".to_string())));
        assert_eq!(range.get((1, 3)), Some(&Data::Float(5000.5)));
        assert_eq!(
            range.get((2, 2)),
            Some(&Data::String("surname not found".to_string()))
        );
        assert_eq!(range.get((3, 0)), Some(&Data::String("ИТОГО:".to_string())));
        assert_eq!(range.get((3, 3)), Some(&Data::Float(20000.5)));
    }

    /// Style attribute of one cell in the first worksheet's XML
    fn cell_style(sheet_xml: &str, cell_ref: &str) -> Option<String> {
        let start = sheet_xml.find(&format!("<c r=\"{}\"", cell_ref))?;
        let tag = &sheet_xml[start..start + sheet_xml[start..].find('>')?];
        let style = tag.split(" s=\"").nth(1)?;
        Some(style.split('"').next()?.to_string())
    }

    #[test]
    fn test_only_header_is_bold() {
        let temp_dir = TempDir::new().unwrap();
        let tables = build_reports(&sample_dataset(), ReportKind::Vehicle);
        let path = temp_dir.path().join("601.xlsx");

        XlsxReportWriter::new().write(&tables[0], &path).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        let mut sheet_xml = String::new();
        archive
            .by_name("xl/worksheets/sheet1.xml")
            .unwrap()
            .read_to_string(&mut sheet_xml)
            .unwrap();

        assert!(cell_style(&sheet_xml, "A1").is_some());
        assert_eq!(cell_style(&sheet_xml, "A4"), cell_style(&sheet_xml, "A2"));
        assert_eq!(cell_style(&sheet_xml, "D4"), cell_style(&sheet_xml, "D2"));
        assert_ne!(cell_style(&sheet_xml, "D4"), cell_style(&sheet_xml, "A1"));
    }

    #[test]
    fn test_write_to_missing_folder_fails() {
        let temp_dir = TempDir::new().unwrap();
        let tables = build_reports(&sample_dataset(), ReportKind::Vehicle);
        let path = temp_dir.path().join("absent").join("report.xlsx");

        let err = XlsxReportWriter::new().write(&tables[0], &path).unwrap_err();
        assert!(matches!(err, ProcessorError::ReportWrite { .. }));
    }
}
