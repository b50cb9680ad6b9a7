//! Report rendering: the combined dataset and its rollups as a formatted
//! multi-sheet workbook.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook as XlsxWorkbook, Worksheet};
use tracing::{debug, info};

use crate::combine::RunSummary;
use crate::error::Result;
use crate::models::LineItem;
use crate::summary::{AccountSummaryRow, StudySummaryRow};

/// Header fill color for all table header rows.
const HEADER_BG_COLOR: u32 = 0xD9D9D9;

/// Accounting number format applied to the three amount columns.
const ACCOUNTING_FORMAT: &str = r#"_($* #,##0.00_);_($* (#,##0.00);_($* "-"??_);_(@_)"#;

const SUMMARY_SHEET: &str = "Summary";
const STUDY_SUMMARY_SHEET: &str = "Study Summary";
const ACCOUNT_SUMMARY_SHEET: &str = "Account Summary";
const COMBINED_DATA_SHEET: &str = "Combined Data";

const SUMMARY_DETAIL_HEADERS: [&str; 11] = [
    "Workbook",
    "Sheet",
    "Invoice Type",
    "Invoice Date",
    "PI",
    "Study Name",
    "Study Code",
    "IRB No",
    "KFS No",
    "Raw Rows",
    "Extracted Rows",
];
const SUMMARY_WIDTHS: [f64; 11] = [
    53.71, 23.0, 18.71, 14.57, 17.14, 22.43, 15.71, 14.71, 10.43, 9.71, 9.71,
];

const STUDY_HEADERS: [&str; 9] = [
    "Study Name",
    "Study Code",
    "KFS No",
    "IRB No",
    "Invoice Date",
    "Invoice Type",
    "Charge Amount",
    "Adjustment",
    "Balance Due",
];
const STUDY_WIDTHS: [f64; 9] = [22.43, 15.71, 10.43, 14.71, 14.57, 18.71, 16.0, 16.0, 16.0];

const ACCOUNT_HEADERS: [&str; 6] = [
    "KFS No",
    "Invoice Date",
    "Invoice Type",
    "Charge Amount",
    "Adjustment",
    "Balance Due",
];
const ACCOUNT_WIDTHS: [f64; 6] = [10.43, 14.57, 18.71, 16.0, 16.0, 16.0];

const COMBINED_HEADERS: [&str; 12] = [
    "Source Workbook",
    "Source Sheet",
    "Invoice Date",
    "Invoice Type",
    "Study Name",
    "Study Code",
    "PI",
    "IRB No",
    "KFS No",
    "Charge Amount",
    "Adjustment",
    "Balance Due",
];
const COMBINED_WIDTHS: [f64; 12] = [
    53.71, 23.0, 14.57, 18.71, 22.43, 15.71, 18.0, 14.71, 10.43, 16.0, 16.0, 16.0,
];

/// Shared cell formats, built once per render.
struct Styles {
    bold: Format,
    header: Format,
    wrap: Format,
    accounting: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            bold: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_BG_COLOR))
                .set_text_wrap(),
            wrap: Format::new().set_text_wrap(),
            accounting: Format::new()
                .set_num_format(ACCOUNTING_FORMAT)
                .set_align(FormatAlign::Right)
                .set_text_wrap(),
        }
    }
}

/// Assembles the four-sheet report workbook.
#[derive(Debug, Default)]
pub struct ReportAssembler;

impl ReportAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Render the report and return the workbook bytes.
    pub fn render(
        &self,
        summary: &RunSummary,
        study: &[StudySummaryRow],
        account: &[AccountSummaryRow],
        rows: &[LineItem],
    ) -> Result<Vec<u8>> {
        let mut workbook = self.build(summary, study, account, rows)?;
        let bytes = workbook.save_to_buffer()?;
        info!(
            "Generated report: {} data rows, {} sheets processed",
            rows.len(),
            summary.total_sheets_processed
        );
        Ok(bytes)
    }

    /// Render the report directly to a file.
    pub fn render_to_file(
        &self,
        path: &std::path::Path,
        summary: &RunSummary,
        study: &[StudySummaryRow],
        account: &[AccountSummaryRow],
        rows: &[LineItem],
    ) -> Result<()> {
        let mut workbook = self.build(summary, study, account, rows)?;
        workbook.save(path)?;
        info!("Saved report to {}", path.display());
        Ok(())
    }

    /// Timestamped default report file name.
    pub fn default_filename(prefix: &str) -> String {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        format!("{}_report_{}.xlsx", prefix, timestamp)
    }

    fn build(
        &self,
        summary: &RunSummary,
        study: &[StudySummaryRow],
        account: &[AccountSummaryRow],
        rows: &[LineItem],
    ) -> Result<XlsxWorkbook> {
        let styles = Styles::new();
        let mut workbook = XlsxWorkbook::new();

        write_summary_sheet(workbook.add_worksheet(), summary, &styles)?;
        write_study_summary(workbook.add_worksheet(), study, &styles)?;
        write_account_summary(workbook.add_worksheet(), account, &styles)?;
        write_combined_data(workbook.add_worksheet(), rows, &styles)?;

        Ok(workbook)
    }
}

fn write_summary_sheet(ws: &mut Worksheet, summary: &RunSummary, styles: &Styles) -> Result<()> {
    ws.set_name(SUMMARY_SHEET)?;

    ws.write_string_with_format(0, 0, "Banner Billings Report Summary", &styles.bold)?;
    ws.write_string_with_format(2, 0, "Processing Information", &styles.bold)?;
    ws.write_string_with_format(3, 0, "Generated", &styles.bold)?;
    ws.write_string(3, 1, &summary.processing_timestamp)?;
    ws.write_string_with_format(4, 0, "Total Source Files", &styles.bold)?;
    ws.write_number(4, 1, summary.total_source_files as f64)?;
    ws.write_string_with_format(5, 0, "Total Sheets Processed", &styles.bold)?;
    ws.write_number(5, 1, summary.total_sheets_processed as f64)?;
    ws.write_string_with_format(6, 0, "Total Rows Extracted", &styles.bold)?;
    ws.write_number(6, 1, summary.total_rows_extracted as f64)?;

    ws.write_string_with_format(8, 0, "Source Files", &styles.bold)?;
    let mut row = 9u32;
    for file in &summary.source_files {
        ws.write_string(row, 1, file)?;
        row += 1;
    }

    row += 1;
    ws.write_string_with_format(row, 0, "Sheet Details", &styles.bold)?;
    row += 1;

    let header_row = row;
    for (col, name) in SUMMARY_DETAIL_HEADERS.iter().enumerate() {
        ws.write_string_with_format(header_row, col as u16, *name, &styles.header)?;
    }

    for sheet in &summary.sheets {
        row += 1;
        ws.write_string(row, 0, &sheet.metadata.workbook_name)?;
        ws.write_string(row, 1, &sheet.metadata.sheet_name)?;
        ws.write_string(row, 2, &sheet.metadata.invoice_category)?;
        ws.write_string(row, 3, &sheet.metadata.invoice_month)?;
        ws.write_string(row, 4, &sheet.metadata.pi)?;
        ws.write_string(row, 5, &sheet.metadata.study_name)?;
        ws.write_string(row, 6, &sheet.metadata.study_code)?;
        ws.write_string(row, 7, &sheet.metadata.irb_no)?;
        ws.write_string(row, 8, &sheet.metadata.kfs_no)?;
        ws.write_number(row, 9, sheet.raw_row_count as f64)?;
        ws.write_number(row, 10, sheet.extracted_row_count as f64)?;
    }

    ws.autofilter(header_row, 0, row, (SUMMARY_DETAIL_HEADERS.len() - 1) as u16)?;
    ws.set_freeze_panes(header_row + 1, 0)?;
    for (col, width) in SUMMARY_WIDTHS.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }

    debug!("Wrote summary sheet ({} sheet detail rows)", summary.sheets.len());
    Ok(())
}

fn write_study_summary(ws: &mut Worksheet, study: &[StudySummaryRow], styles: &Styles) -> Result<()> {
    ws.set_name(STUDY_SUMMARY_SHEET)?;

    for (row_idx, row) in study.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        ws.write_string_with_format(r, 0, &row.study_name, &styles.wrap)?;
        ws.write_string_with_format(r, 1, &row.study_code, &styles.wrap)?;
        ws.write_string_with_format(r, 2, &row.kfs_no, &styles.wrap)?;
        ws.write_string_with_format(r, 3, &row.irb_no, &styles.wrap)?;
        ws.write_string_with_format(r, 4, &row.invoice_month, &styles.wrap)?;
        ws.write_string_with_format(r, 5, &row.invoice_category, &styles.wrap)?;
        write_amount(ws, r, 6, row.charge_amount, styles)?;
        write_amount(ws, r, 7, row.adjustment, styles)?;
        write_amount(ws, r, 8, row.balance_due, styles)?;
    }

    finish_data_sheet(ws, &STUDY_HEADERS, &STUDY_WIDTHS, study.len(), styles)?;
    debug!("Wrote {}: {} rows", STUDY_SUMMARY_SHEET, study.len());
    Ok(())
}

fn write_account_summary(
    ws: &mut Worksheet,
    account: &[AccountSummaryRow],
    styles: &Styles,
) -> Result<()> {
    ws.set_name(ACCOUNT_SUMMARY_SHEET)?;

    for (row_idx, row) in account.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        ws.write_string_with_format(r, 0, &row.kfs_no, &styles.wrap)?;
        ws.write_string_with_format(r, 1, &row.invoice_month, &styles.wrap)?;
        ws.write_string_with_format(r, 2, &row.invoice_category, &styles.wrap)?;
        write_amount(ws, r, 3, row.charge_amount, styles)?;
        write_amount(ws, r, 4, row.adjustment, styles)?;
        write_amount(ws, r, 5, row.balance_due, styles)?;
    }

    finish_data_sheet(ws, &ACCOUNT_HEADERS, &ACCOUNT_WIDTHS, account.len(), styles)?;
    debug!("Wrote {}: {} rows", ACCOUNT_SUMMARY_SHEET, account.len());
    Ok(())
}

fn write_combined_data(ws: &mut Worksheet, rows: &[LineItem], styles: &Styles) -> Result<()> {
    ws.set_name(COMBINED_DATA_SHEET)?;

    if rows.is_empty() {
        ws.write_string_with_format(0, 0, "Message", &styles.header)?;
        ws.write_string(1, 0, "No data extracted")?;
        debug!("Combined data sheet is empty, wrote placeholder message");
        return Ok(());
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let r = (row_idx + 1) as u32;
        ws.write_string_with_format(r, 0, &row.source_workbook, &styles.wrap)?;
        ws.write_string_with_format(r, 1, &row.source_sheet, &styles.wrap)?;
        ws.write_string_with_format(r, 2, &row.invoice_month, &styles.wrap)?;
        ws.write_string_with_format(r, 3, &row.invoice_category, &styles.wrap)?;
        ws.write_string_with_format(r, 4, &row.study_name, &styles.wrap)?;
        ws.write_string_with_format(r, 5, &row.study_code, &styles.wrap)?;
        ws.write_string_with_format(r, 6, &row.pi, &styles.wrap)?;
        ws.write_string_with_format(r, 7, &row.irb_no, &styles.wrap)?;
        ws.write_string_with_format(r, 8, &row.kfs_no, &styles.wrap)?;
        write_amount(ws, r, 9, row.charge_amount, styles)?;
        write_amount(ws, r, 10, row.adjustment, styles)?;
        write_amount(ws, r, 11, row.balance_due, styles)?;
    }

    finish_data_sheet(ws, &COMBINED_HEADERS, &COMBINED_WIDTHS, rows.len(), styles)?;
    debug!("Wrote {}: {} rows", COMBINED_DATA_SHEET, rows.len());
    Ok(())
}

fn write_amount(ws: &mut Worksheet, row: u32, col: u16, amount: Decimal, styles: &Styles) -> Result<()> {
    ws.write_number_with_format(row, col, amount.to_f64().unwrap_or(0.0), &styles.accounting)?;
    Ok(())
}

/// Header row, autofilter, frozen pane, and column widths for a data sheet.
fn finish_data_sheet(
    ws: &mut Worksheet,
    headers: &[&str],
    widths: &[f64],
    data_rows: usize,
    styles: &Styles,
) -> Result<()> {
    for (col, name) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *name, &styles.header)?;
    }
    ws.autofilter(0, 0, data_rows as u32, (headers.len() - 1) as u16)?;
    ws.set_freeze_panes(1, 0)?;
    for (col, width) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, *width)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combine::{Combiner, SheetRecord};
    use crate::models::{Metadata, SheetExtraction};

    fn sample_run() -> (RunSummary, Vec<LineItem>) {
        let mut combiner = Combiner::new();
        let rows = vec![LineItem {
            source_workbook: "AZCC May 2025 Banner Hospital Invoices.xlsx".to_string(),
            source_sheet: "Bill 1".to_string(),
            invoice_category: "hospital".to_string(),
            invoice_month: "2025-05-01".to_string(),
            pi: "Dr. Okafor".to_string(),
            study_name: "Cardiac Trial".to_string(),
            study_code: String::new(),
            irb_no: "IRB-1".to_string(),
            kfs_no: "1234567".to_string(),
            charge_amount: Decimal::new(120000, 2),
            adjustment: Decimal::ZERO,
            balance_due: Decimal::new(120000, 2),
        }];
        combiner.add_workbook(
            "AZCC May 2025 Banner Hospital Invoices.xlsx",
            vec![SheetExtraction {
                metadata: Metadata {
                    sheet_name: "Bill 1".to_string(),
                    workbook_name: "AZCC May 2025 Banner Hospital Invoices.xlsx".to_string(),
                    invoice_category: "hospital".to_string(),
                    invoice_month: "2025-05-01".to_string(),
                    ..Default::default()
                },
                rows: rows.clone(),
                raw_row_count: 20,
                dropped_row_count: 2,
            }],
        );
        (combiner.run_summary(), rows)
    }

    #[test]
    fn test_render_produces_workbook_bytes() {
        let (summary, rows) = sample_run();
        let study = crate::summary::study_level_summary(&rows);
        let account = crate::summary::account_level_summary(&rows);

        let bytes = ReportAssembler::new()
            .render(&summary, &study, &account, &rows)
            .unwrap();
        assert!(!bytes.is_empty());
        // XLSX files are zip archives.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_render_empty_run() {
        let summary = RunSummary {
            processing_timestamp: "2025-05-01T00:00:00".to_string(),
            total_source_files: 0,
            source_files: Vec::new(),
            total_sheets_processed: 0,
            total_rows_extracted: 0,
            sheets: Vec::<SheetRecord>::new(),
        };

        let bytes = ReportAssembler::new().render(&summary, &[], &[], &[]).unwrap();
        assert!(!bytes.is_empty());
    }

    #[test]
    fn test_default_filename_shape() {
        let name = ReportAssembler::default_filename("banner_billings");
        assert!(name.starts_with("banner_billings_report_"));
        assert!(name.ends_with(".xlsx"));
    }
}
