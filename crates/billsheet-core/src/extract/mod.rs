//! Sheet extraction: table location, metadata scanning, and row parsing.

pub mod filename;
pub mod locator;
pub mod metadata;
pub mod rows;

pub use filename::classify;
pub use locator::{locate_table, ColumnMap, TableBounds};
pub use metadata::{normalize_label, scan_labelled_fields};
pub use rows::{extract_rows, parse_currency, LineAmounts};

use chrono::Local;
use tracing::{debug, warn};

use crate::models::{ExtractConfig, InvoiceCategory, LineItem, Metadata, SheetExtraction, SheetGrid};

/// Per-workbook sheet extractor.
///
/// Carries the workbook-level context (name, category, invoice month) that
/// gets stamped onto every extracted sheet and row. The category and month
/// are derived from the file name once, at construction.
#[derive(Debug, Clone)]
pub struct SheetExtractor {
    workbook_name: String,
    category: InvoiceCategory,
    invoice_month: String,
    config: ExtractConfig,
}

impl SheetExtractor {
    /// Create an extractor for a workbook, classifying its file name.
    pub fn new(workbook_name: impl Into<String>) -> Self {
        let workbook_name = workbook_name.into();
        let (category, invoice_month) = filename::classify(&workbook_name);
        debug!(
            "Extractor for workbook '{}': category={}, invoice_month={}",
            workbook_name,
            category,
            if invoice_month.is_empty() {
                "(not found)"
            } else {
                invoice_month.as_str()
            }
        );
        Self {
            workbook_name,
            category,
            invoice_month,
            config: ExtractConfig::default(),
        }
    }

    /// Replace the extraction configuration.
    pub fn with_config(mut self, config: ExtractConfig) -> Self {
        self.config = config;
        self
    }

    /// Invoice category derived from the workbook name.
    pub fn category(&self) -> InvoiceCategory {
        self.category
    }

    /// Extract one sheet: locate the table, scan metadata, parse rows, and
    /// stamp the metadata onto every retained line item.
    ///
    /// A sheet with no locatable table still yields populated context
    /// metadata (with blank label/value fields) and an empty row set.
    pub fn extract(&self, grid: &SheetGrid) -> SheetExtraction {
        let located = locate_table(grid, self.category, &self.config);

        let mut metadata = Metadata {
            sheet_name: grid.name().to_string(),
            workbook_name: self.workbook_name.clone(),
            invoice_category: self.category.as_str().to_string(),
            invoice_month: self.invoice_month.clone(),
            extracted_at: Local::now().to_rfc3339(),
            ..Default::default()
        };

        match &located {
            Some(bounds) if bounds.header_start > 0 => {
                scan_labelled_fields(grid, self.category, bounds.header_start, &mut metadata);
            }
            Some(_) => {
                debug!(
                    "Table starts at the top of sheet '{}', no metadata region",
                    grid.name()
                );
            }
            None => {
                warn!(
                    "Could not find target columns in sheet '{}' (category={}), \
                     extracting blank metadata and no rows",
                    grid.name(),
                    self.category
                );
            }
        }

        let (amounts, dropped_row_count) = match &located {
            Some(bounds) => extract_rows(grid, bounds),
            None => (Vec::new(), 0),
        };

        let rows = amounts
            .into_iter()
            .map(|a| LineItem {
                source_workbook: self.workbook_name.clone(),
                source_sheet: grid.name().to_string(),
                invoice_category: self.category.as_str().to_string(),
                invoice_month: self.invoice_month.clone(),
                pi: metadata.pi.clone(),
                study_name: metadata.study_name.clone(),
                study_code: metadata.study_code.clone(),
                irb_no: metadata.irb_no.clone(),
                kfs_no: metadata.kfs_no.clone(),
                charge_amount: a.charge_amount,
                adjustment: a.adjustment,
                balance_due: a.balance_due,
            })
            .collect::<Vec<_>>();

        debug!(
            "Extracted sheet '{}': {} rows kept, {} dropped",
            grid.name(),
            rows.len(),
            dropped_row_count
        );

        SheetExtraction {
            metadata,
            rows,
            raw_row_count: grid.row_count(),
            dropped_row_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    /// Hospital sheet: metadata in B/C, 1-row header at row 12, one partial
    /// row, and a totals footer.
    fn hospital_sheet() -> SheetGrid {
        let mut rows = vec![
            vec![Cell::Empty, text("PI:"), text("Dr. Okafor")],
            vec![Cell::Empty, text("STUDY NAME:"), text("Cardiac Trial")],
            vec![Cell::Empty, text("KFS NO.:"), text("1234567")],
        ];
        rows.extend(vec![vec![Cell::Empty; 4]; 9]);
        rows.push(vec![
            text("Description"),
            text("Charge Amount"),
            text("Adjustment"),
            text("Balance Due"),
        ]);
        rows.push(vec![
            text("Visit 1"),
            text("$1,200.00"),
            text("$0.00"),
            text("$1,200.00"),
        ]);
        rows.push(vec![
            text("Visit 2"),
            text("$1,200.00"),
            text(""),
            text("$1,200.00"),
        ]);
        rows.push(vec![
            text("TOTAL AMOUNT DUE"),
            text("$1,200.00"),
            Cell::Empty,
            Cell::Empty,
        ]);
        SheetGrid::new("Bill 1", rows)
    }

    #[test]
    fn test_extract_hospital_sheet() {
        let extractor = SheetExtractor::new("AZCC May 2025 Banner Hospital Invoices.xlsx");
        let result = extractor.extract(&hospital_sheet());

        assert_eq!(result.metadata.pi, "Dr. Okafor");
        assert_eq!(result.metadata.study_name, "Cardiac Trial");
        assert_eq!(result.metadata.kfs_no, "1234567");
        assert_eq!(result.metadata.invoice_category, "hospital");
        assert_eq!(result.metadata.invoice_month, "2025-05-01");
        assert!(!result.metadata.extracted_at.is_empty());

        // The blank-adjustment row is excluded entirely.
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.dropped_row_count, 1);
        assert_eq!(
            result.rows[0].charge_amount,
            Decimal::from_str("1200.00").unwrap()
        );

        // Metadata and tracking fields are stamped onto every row.
        let row = &result.rows[0];
        assert_eq!(row.source_sheet, "Bill 1");
        assert_eq!(row.source_workbook, "AZCC May 2025 Banner Hospital Invoices.xlsx");
        assert_eq!(row.invoice_category, "hospital");
        assert_eq!(row.invoice_month, "2025-05-01");
        assert_eq!(row.kfs_no, "1234567");
    }

    #[test]
    fn test_extracted_rows_never_exceed_raw_rows() {
        let extractor = SheetExtractor::new("AZCC May 2025 Banner Hospital Invoices.xlsx");
        let grid = hospital_sheet();
        let result = extractor.extract(&grid);
        assert!(result.rows.len() <= result.raw_row_count);
        assert_eq!(result.raw_row_count, grid.row_count());
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = SheetExtractor::new("AZCC May 2025 Banner Hospital Invoices.xlsx");
        let grid = hospital_sheet();

        let first = extractor.extract(&grid);
        let second = extractor.extract(&grid);

        // Everything except the extraction timestamp is identical.
        assert_eq!(first.rows, second.rows);
        assert_eq!(first.raw_row_count, second.raw_row_count);
        assert_eq!(first.dropped_row_count, second.dropped_row_count);
        assert_eq!(first.metadata.kfs_no, second.metadata.kfs_no);
    }

    #[test]
    fn test_sheet_without_table_yields_blank_metadata_and_no_rows() {
        let grid = SheetGrid::new(
            "Notes",
            vec![
                vec![text("This tab is a cover page")],
                vec![text("Nothing to extract here")],
            ],
        );
        let extractor = SheetExtractor::new("AZCC May 2025 Banner Hospital Invoices.xlsx");
        let result = extractor.extract(&grid);

        assert!(result.rows.is_empty());
        assert!(result.metadata.fields_all_blank());
        // Context fields are still populated for traceability.
        assert_eq!(result.metadata.sheet_name, "Notes");
        assert_eq!(result.metadata.invoice_category, "hospital");
    }
}
