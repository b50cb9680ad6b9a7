//! Error types for the billsheet-core library.

use thiserror::Error;

/// Main error type for the billsheet library.
#[derive(Error, Debug)]
pub enum BillsheetError {
    /// Workbook decoding error.
    #[error("workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(#[from] rust_xlsxwriter::XlsxError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to opening and decoding workbook files.
///
/// A failure here is fatal for the affected workbook; the caller decides
/// whether to abort the run or skip the file. Extraction conditions such as
/// a missing table or unparseable rows are never surfaced as errors.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The file could not be opened or parsed as a spreadsheet.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// A sheet could not be decoded into a grid.
    #[error("failed to read sheet '{sheet}': {reason}")]
    Sheet { sheet: String, reason: String },

    /// The file extension is not a supported spreadsheet format.
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
}

/// Result type for the billsheet library.
pub type Result<T> = std::result::Result<T, BillsheetError>;
