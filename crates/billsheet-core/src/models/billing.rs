//! Billing data models: invoice categories, sheet metadata, and line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three numeric columns extracted from every billing table.
pub const TARGET_COLUMNS: [&str; 3] = ["Charge Amount", "Adjustment", "Balance Due"];

/// Invoice category, derived from the workbook file name only.
///
/// The category is a closed set carrying the per-category extraction
/// conventions: how many header rows the table uses, which columns hold the
/// metadata label/value pairs, and which metadata fields to expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceCategory {
    /// Hospital invoices: single header row, labels in column B, values in C.
    Hospital,
    /// Professional invoices: 2-row header (merged cells), labels in A, values in B.
    Professional,
    /// Category could not be determined from the file name.
    Unknown,
}

impl InvoiceCategory {
    /// Lowercase string form, used in grouping keys and report cells.
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceCategory::Hospital => "hospital",
            InvoiceCategory::Professional => "professional",
            InvoiceCategory::Unknown => "unknown",
        }
    }

    /// Header-row counts to try, in order, when locating the table.
    ///
    /// Unknown falls back from a 1-row to a 2-row header.
    pub fn header_row_attempts(&self) -> &'static [usize] {
        match self {
            InvoiceCategory::Hospital => &[1],
            InvoiceCategory::Professional => &[2],
            InvoiceCategory::Unknown => &[1, 2],
        }
    }

    /// (label column, value column) for the metadata block above the table.
    pub fn metadata_columns(&self) -> (usize, usize) {
        match self {
            // Hospital convention also serves as the Unknown default.
            InvoiceCategory::Hospital | InvoiceCategory::Unknown => (1, 2),
            InvoiceCategory::Professional => (0, 1),
        }
    }

    /// Metadata fields expected above the table for this category.
    ///
    /// Unknown accepts the union of both category field sets.
    pub fn expected_fields(&self) -> &'static [MetadataField] {
        use MetadataField::*;
        match self {
            // PI is optional on hospital sheets but still scanned for.
            InvoiceCategory::Hospital => &[Pi, StudyName, IrbNo, KfsNo],
            // IRB NO is optional on professional sheets.
            InvoiceCategory::Professional => &[Pi, StudyName, StudyCode, IrbNo, KfsNo],
            InvoiceCategory::Unknown => &[Pi, StudyName, StudyCode, IrbNo, KfsNo],
        }
    }
}

impl fmt::Display for InvoiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata field found as a label/value pair above the billing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    /// Principal investigator.
    Pi,
    /// Study name.
    StudyName,
    /// Study code (professional invoices only).
    StudyCode,
    /// IRB number.
    IrbNo,
    /// KFS account number.
    KfsNo,
}

impl MetadataField {
    /// Canonical label as it appears on the sheets (before normalization).
    pub fn label(&self) -> &'static str {
        match self {
            MetadataField::Pi => "PI",
            MetadataField::StudyName => "STUDY NAME",
            MetadataField::StudyCode => "STUDY CODE",
            MetadataField::IrbNo => "IRB NO",
            MetadataField::KfsNo => "KFS NO",
        }
    }
}

/// Metadata extracted from one sheet: the label/value fields found above the
/// table, plus sheet/workbook identity and classification context.
///
/// Every field is always present; fields that were not found on the sheet
/// are empty strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Name of the sheet this metadata came from.
    pub sheet_name: String,

    /// Name of the workbook file the sheet belongs to.
    pub workbook_name: String,

    /// Invoice category derived from the workbook file name.
    pub invoice_category: String,

    /// First-of-month invoice date (`YYYY-MM-01`) from the file name, or empty.
    pub invoice_month: String,

    /// RFC 3339 timestamp of when extraction ran.
    pub extracted_at: String,

    /// Principal investigator.
    pub pi: String,

    /// Study name.
    pub study_name: String,

    /// Study code.
    pub study_code: String,

    /// IRB number.
    pub irb_no: String,

    /// KFS account number.
    pub kfs_no: String,
}

impl Metadata {
    /// Read a label/value field by its field kind.
    pub fn field(&self, field: MetadataField) -> &str {
        match field {
            MetadataField::Pi => &self.pi,
            MetadataField::StudyName => &self.study_name,
            MetadataField::StudyCode => &self.study_code,
            MetadataField::IrbNo => &self.irb_no,
            MetadataField::KfsNo => &self.kfs_no,
        }
    }

    /// Write a label/value field by its field kind.
    pub fn set_field(&mut self, field: MetadataField, value: String) {
        match field {
            MetadataField::Pi => self.pi = value,
            MetadataField::StudyName => self.study_name = value,
            MetadataField::StudyCode => self.study_code = value,
            MetadataField::IrbNo => self.irb_no = value,
            MetadataField::KfsNo => self.kfs_no = value,
        }
    }

    /// True if none of the label/value fields were populated.
    pub fn fields_all_blank(&self) -> bool {
        self.pi.is_empty()
            && self.study_name.is_empty()
            && self.study_code.is_empty()
            && self.irb_no.is_empty()
            && self.kfs_no.is_empty()
    }
}

/// One extracted billing line item.
///
/// A line item exists only if all three amounts parsed; the sheet metadata
/// and source tracking fields are copied onto every row so the combined
/// table is self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Workbook file the row came from.
    pub source_workbook: String,

    /// Sheet the row came from.
    pub source_sheet: String,

    /// Invoice category of the source workbook.
    pub invoice_category: String,

    /// First-of-month invoice date, or empty.
    pub invoice_month: String,

    /// Principal investigator (from sheet metadata).
    pub pi: String,

    /// Study name (from sheet metadata).
    pub study_name: String,

    /// Study code (from sheet metadata).
    pub study_code: String,

    /// IRB number (from sheet metadata).
    pub irb_no: String,

    /// KFS account number (from sheet metadata).
    pub kfs_no: String,

    /// Charged amount.
    pub charge_amount: Decimal,

    /// Adjustment applied.
    pub adjustment: Decimal,

    /// Balance due.
    pub balance_due: Decimal,
}

/// Result of extracting one sheet: metadata is always populated, rows may be
/// empty when no table was located.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetExtraction {
    /// Metadata for the sheet (blank fields where nothing was found).
    pub metadata: Metadata,

    /// Retained line items.
    pub rows: Vec<LineItem>,

    /// Total number of rows in the raw grid.
    pub raw_row_count: usize,

    /// Rows inside the table bounds that were discarded because one or more
    /// amounts failed to parse.
    pub dropped_row_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_conventions() {
        assert_eq!(InvoiceCategory::Hospital.header_row_attempts(), &[1]);
        assert_eq!(InvoiceCategory::Professional.header_row_attempts(), &[2]);
        assert_eq!(InvoiceCategory::Unknown.header_row_attempts(), &[1, 2]);

        assert_eq!(InvoiceCategory::Hospital.metadata_columns(), (1, 2));
        assert_eq!(InvoiceCategory::Professional.metadata_columns(), (0, 1));
        assert_eq!(InvoiceCategory::Unknown.metadata_columns(), (1, 2));
    }

    #[test]
    fn test_unknown_expects_union_of_fields() {
        let fields = InvoiceCategory::Unknown.expected_fields();
        assert!(fields.contains(&MetadataField::StudyCode));
        assert!(fields.contains(&MetadataField::KfsNo));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_metadata_field_roundtrip() {
        let mut meta = Metadata::default();
        assert!(meta.fields_all_blank());
        meta.set_field(MetadataField::KfsNo, "1234567".to_string());
        assert_eq!(meta.field(MetadataField::KfsNo), "1234567");
        assert!(!meta.fields_all_blank());
    }
}
