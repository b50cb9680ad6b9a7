//! Workbook decoding: spreadsheet files into named grids of untyped cells.
//!
//! No schema is assumed at this layer; every sheet is read raw (no header
//! row) so the extraction heuristics can find the table themselves.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_from_rs, Data, Range, Reader, Xls, Xlsb, Xlsx};
use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::error::WorkbookError;
use crate::extract::filename;
use crate::models::{Cell, InvoiceCategory, SheetGrid};

/// A decoded billing workbook: classified file name plus raw sheet grids.
///
/// Empty sheets are dropped at decode time; a workbook with no data sheets
/// is valid (it simply contributes nothing to a run).
#[derive(Debug, Clone)]
pub struct Workbook {
    /// Source file name (with extension, path stripped).
    pub name: String,

    /// Invoice category derived from the file name.
    pub category: InvoiceCategory,

    /// First-of-month invoice date (`YYYY-MM-01`) from the file name, or empty.
    pub invoice_month: String,

    /// Decoded sheets, in workbook order.
    pub sheets: Vec<SheetGrid>,
}

impl Workbook {
    /// Open and decode a workbook file from disk.
    pub fn open(path: &Path) -> Result<Self, WorkbookError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let mut reader =
            open_workbook_auto(path).map_err(|e| WorkbookError::Open(e.to_string()))?;
        let sheets = read_all_sheets(&mut reader);
        Ok(Self::assemble(name, sheets))
    }

    /// Decode a workbook from an in-memory byte buffer.
    ///
    /// The file name is still required: it carries the invoice category and
    /// month, and selects the decoder by extension.
    pub fn from_bytes(name: &str, data: &[u8]) -> Result<Self, WorkbookError> {
        let ext = name.rsplit('.').next().unwrap_or("").to_lowercase();
        let cursor = Cursor::new(data.to_vec());

        let sheets = match ext.as_str() {
            "xlsx" | "xlsm" => {
                let mut reader: Xlsx<_> = open_workbook_from_rs(cursor)
                    .map_err(|e: calamine::XlsxError| WorkbookError::Open(e.to_string()))?;
                read_all_sheets(&mut reader)
            }
            "xlsb" => {
                let mut reader: Xlsb<_> = open_workbook_from_rs(cursor)
                    .map_err(|e: calamine::XlsbError| WorkbookError::Open(e.to_string()))?;
                read_all_sheets(&mut reader)
            }
            "xls" => {
                let mut reader: Xls<_> = open_workbook_from_rs(cursor)
                    .map_err(|e: calamine::XlsError| WorkbookError::Open(e.to_string()))?;
                read_all_sheets(&mut reader)
            }
            _ => return Err(WorkbookError::UnsupportedFormat(ext)),
        };

        Ok(Self::assemble(name.to_string(), sheets))
    }

    fn assemble(name: String, sheets: Vec<SheetGrid>) -> Self {
        let (category, invoice_month) = filename::classify(&name);
        info!(
            "Decoded workbook '{}': {} sheets, category={}, invoice_month={}",
            name,
            sheets.len(),
            category,
            if invoice_month.is_empty() {
                "(not found)"
            } else {
                invoice_month.as_str()
            }
        );
        Self {
            name,
            category,
            invoice_month,
            sheets,
        }
    }
}

/// Read every sheet from an open reader, skipping unreadable or empty ones.
fn read_all_sheets<RS, R>(reader: &mut R) -> Vec<SheetGrid>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
    R::Error: std::fmt::Display,
{
    let sheet_names = reader.sheet_names().to_owned();
    let mut sheets = Vec::new();

    for name in &sheet_names {
        let range = match reader.worksheet_range(name) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping sheet '{}': {}", name, e);
                continue;
            }
        };

        let grid = range_to_grid(name, &range);
        if grid.is_empty() {
            warn!("Skipping empty sheet '{}'", name);
            continue;
        }
        sheets.push(grid);
    }

    sheets
}

/// Convert a calamine range into a raw grid.
fn range_to_grid(name: &str, range: &Range<Data>) -> SheetGrid {
    let rows = range
        .rows()
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();
    SheetGrid::new(name, rows)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(excel_serial_to_iso(dt.as_f64())),
        Data::DateTimeIso(s) => Cell::Text(s.clone()),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#ERR:{:?}", e)),
    }
}

/// Render an Excel serial date number as an ISO date or datetime string.
///
/// Excel serials count days from 1899-12-31 with a phantom 1900-02-29 at
/// serial 60 (the 1900 leap-year bug), so serials past 59 shift by one day.
fn excel_serial_to_iso(serial: f64) -> String {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).expect("valid epoch");
    let days = serial.trunc() as i64;
    let days = if days > 59 { days } else { days + 1 };

    let date = epoch + Duration::days(days);
    let secs = ((serial.fract()) * 86400.0).round() as i64;
    let secs = secs.clamp(0, 86399);

    if secs == 0 {
        date.format("%Y-%m-%d").to_string()
    } else {
        let (hours, rem) = (secs / 3600, secs % 3600);
        format!(
            "{} {:02}:{:02}:{:02}",
            date.format("%Y-%m-%d"),
            hours,
            rem / 60,
            rem % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_excel_serial_known_dates() {
        assert_eq!(excel_serial_to_iso(1.0), "1900-01-01");
        assert_eq!(excel_serial_to_iso(59.0), "1900-02-28");
        assert_eq!(excel_serial_to_iso(61.0), "1900-03-01");
        assert_eq!(excel_serial_to_iso(25569.0), "1970-01-01");
        assert_eq!(excel_serial_to_iso(36526.0), "2000-01-01");
    }

    #[test]
    fn test_excel_serial_with_time() {
        assert_eq!(excel_serial_to_iso(25569.5), "1970-01-01 12:00:00");
    }

    #[test]
    fn test_convert_cell_types() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(
            convert_cell(&Data::String("PI".to_string())),
            Cell::Text("PI".to_string())
        );
        assert_eq!(convert_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(convert_cell(&Data::Float(1200.5)), Cell::Number(1200.5));
    }

    #[test]
    fn test_from_bytes_rejects_unknown_extension() {
        let err = Workbook::from_bytes("invoices.txt", b"not a spreadsheet").unwrap_err();
        assert!(matches!(err, WorkbookError::UnsupportedFormat(_)));
    }
}
