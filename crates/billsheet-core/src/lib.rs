//! Core library for billing workbook extraction.
//!
//! This crate provides:
//! - Workbook decoding (spreadsheet files into raw, untyped sheet grids)
//! - Heuristic extraction (filename classification, table location,
//!   metadata scanning, currency row parsing)
//! - Cross-sheet/cross-workbook combination with run statistics
//! - Study-level and account-level rollups
//! - Formatted multi-sheet report rendering

pub mod combine;
pub mod error;
pub mod extract;
pub mod models;
pub mod report;
pub mod summary;
pub mod workbook;

pub use combine::{Combiner, RunSummary, SheetRecord};
pub use error::{BillsheetError, Result, WorkbookError};
pub use extract::{classify, parse_currency, SheetExtractor};
pub use models::{
    Cell, ExtractConfig, InvoiceCategory, LineItem, Metadata, SheetExtraction, SheetGrid,
};
pub use report::ReportAssembler;
pub use summary::{account_level_summary, study_level_summary, AccountSummaryRow, StudySummaryRow};
pub use workbook::Workbook;
