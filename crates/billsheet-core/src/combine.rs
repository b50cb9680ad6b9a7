//! Combining extracted sheets across workbooks into one dataset.
//!
//! The combiner is an append-only accumulator owned by a single processing
//! run: one `add_workbook` call per workbook, in order, then read-only
//! queries. It is deliberately not shareable; concurrent extraction should
//! materialize each workbook's `SheetExtraction` list first and serialize
//! the adds.

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::{LineItem, Metadata, SheetExtraction};

/// Per-sheet record kept alongside the combined rows, for the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetRecord {
    /// The sheet's extracted metadata.
    pub metadata: Metadata,

    /// Total rows in the sheet's raw grid.
    pub raw_row_count: usize,

    /// Line items retained from the sheet.
    pub extracted_row_count: usize,

    /// Rows inside the table that failed numeric parsing.
    pub dropped_row_count: usize,
}

/// Summary statistics for one processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run's combiner was created.
    pub processing_timestamp: String,

    /// Number of distinct source workbooks.
    pub total_source_files: usize,

    /// Source workbook names, in first-seen order.
    pub source_files: Vec<String>,

    /// Number of sheets processed (including sheets with zero rows).
    pub total_sheets_processed: usize,

    /// Total line items in the combined table.
    pub total_rows_extracted: usize,

    /// Per-sheet detail.
    pub sheets: Vec<SheetRecord>,
}

/// Append-only accumulator for one processing run.
#[derive(Debug)]
pub struct Combiner {
    rows: Vec<LineItem>,
    sheet_records: Vec<SheetRecord>,
    source_files: Vec<String>,
    processing_timestamp: String,
}

impl Combiner {
    /// Create an empty combiner for a new run.
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            sheet_records: Vec::new(),
            source_files: Vec::new(),
            processing_timestamp: Local::now().to_rfc3339(),
        }
    }

    /// Reset all accumulated state for a fresh run.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.sheet_records.clear();
        self.source_files.clear();
        self.processing_timestamp = Local::now().to_rfc3339();
    }

    /// Append one workbook's extracted sheets.
    ///
    /// Records the workbook name once (first-seen order), then each sheet's
    /// metadata and line items in sheet order. Sheets with zero rows still
    /// contribute their metadata record.
    pub fn add_workbook(&mut self, workbook_name: &str, sheets: Vec<SheetExtraction>) {
        if !self.source_files.iter().any(|f| f == workbook_name) {
            self.source_files.push(workbook_name.to_string());
        }
        for sheet in sheets {
            self.add_sheet(sheet);
        }
    }

    /// Append one extracted sheet.
    pub fn add_sheet(&mut self, sheet: SheetExtraction) {
        let workbook_name = &sheet.metadata.workbook_name;
        if !workbook_name.is_empty() && !self.source_files.iter().any(|f| f == workbook_name) {
            self.source_files.push(workbook_name.clone());
        }

        debug!(
            "Added sheet '{}' ({} rows)",
            sheet.metadata.sheet_name,
            sheet.rows.len()
        );

        self.sheet_records.push(SheetRecord {
            metadata: sheet.metadata,
            raw_row_count: sheet.raw_row_count,
            extracted_row_count: sheet.rows.len(),
            dropped_row_count: sheet.dropped_row_count,
        });
        self.rows.extend(sheet.rows);
    }

    /// The full combined table.
    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    /// True if no line items have been accumulated.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Summary statistics for the run so far.
    pub fn run_summary(&self) -> RunSummary {
        info!(
            "Combined dataset: {} rows from {} sheets across {} files",
            self.rows.len(),
            self.sheet_records.len(),
            self.source_files.len()
        );
        RunSummary {
            processing_timestamp: self.processing_timestamp.clone(),
            total_source_files: self.source_files.len(),
            source_files: self.source_files.clone(),
            total_sheets_processed: self.sheet_records.len(),
            total_rows_extracted: self.rows.len(),
            sheets: self.sheet_records.clone(),
        }
    }

    /// Inspect the combined rows for consistency issues.
    ///
    /// Returns human-readable warnings; never fails. An empty dataset, rows
    /// with no metadata at all, and hospital rows carrying a study code (a
    /// field that category's sheets do not define) are all reported.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.rows.is_empty() {
            issues.push("No data extracted from any sheets".to_string());
            return issues;
        }

        let untraceable = self
            .rows
            .iter()
            .filter(|r| {
                r.pi.is_empty()
                    && r.study_name.is_empty()
                    && r.study_code.is_empty()
                    && r.irb_no.is_empty()
                    && r.kfs_no.is_empty()
            })
            .count();
        if untraceable > 0 {
            issues.push(format!(
                "{} rows have no metadata fields populated",
                untraceable
            ));
        }

        let inconsistent = self
            .rows
            .iter()
            .filter(|r| r.invoice_category == "hospital" && !r.study_code.is_empty())
            .count();
        if inconsistent > 0 {
            issues.push(format!(
                "{} hospital rows carry a study code, which hospital sheets do not define",
                inconsistent
            ));
        }

        for issue in &issues {
            warn!("Combined data validation: {}", issue);
        }
        issues
    }
}

impl Default for Combiner {
    fn default() -> Self {
        Self::new()
    }
}
