// src/export.rs

use crate::report::Report;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;
use tracing::info;

fn fill_sheet(sheet: &mut Worksheet, report: &Report, sheet_name: &str) -> Result<(), XlsxError> {
    sheet.set_name(sheet_name)?;

    let header = Format::new().set_bold();
    for (col, title) in report.columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, title, &header)?;
    }

    for (i, record) in report.rows.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &record.source)?;
        for (j, value) in record.values.iter().enumerate() {
            // absent fields stay as empty cells
            if let Some(v) = value {
                sheet.write_string(row, (j + 1) as u16, v)?;
            }
        }
    }

    sheet.autofit();
    Ok(())
}

fn build_workbook(report: &Report, sheet_name: &str) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    fill_sheet(sheet, report, sheet_name)?;
    Ok(workbook)
}

/// Serialize the report to an in-memory `.xlsx` file.
pub fn write_xlsx(report: &Report, sheet_name: &str) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = build_workbook(report, sheet_name)?;
    let bytes = workbook.save_to_buffer()?;
    info!(rows = report.rows.len(), bytes = bytes.len(), "Spreadsheet written");
    Ok(bytes)
}

/// Serialize the report straight to disk.
pub fn save_xlsx(report: &Report, sheet_name: &str, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = build_workbook(report, sheet_name)?;
    workbook.save(path)?;
    info!(rows = report.rows.len(), path = %path.display(), "Spreadsheet saved");
    Ok(())
}
