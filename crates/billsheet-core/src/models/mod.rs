//! Data models for billing workbook extraction.

pub mod billing;
pub mod config;
pub mod grid;

pub use billing::{
    InvoiceCategory, LineItem, Metadata, MetadataField, SheetExtraction, TARGET_COLUMNS,
};
pub use config::ExtractConfig;
pub use grid::{Cell, SheetGrid};
