//! Workbook file name classification.
//!
//! Billing exports encode the invoice category ("Hospital" / "Professional")
//! and the billing month (e.g. "May 2025", "Sept 2025") in the file name,
//! never in the sheet content.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

use crate::models::InvoiceCategory;

lazy_static! {
    // Month followed by a 4-digit year. Longer alternatives first so
    // "september" is not consumed as "sep"; "sept" is an irregular
    // abbreviation that appears in real exports.
    static ref INVOICE_MONTH: Regex = Regex::new(
        r"(?i)(january|february|march|april|may|june|july|august|september|october|november|december|sept|jan|feb|mar|apr|jun|jul|aug|sep|oct|nov|dec)\s+(\d{4})"
    )
    .unwrap();
}

/// Classify a workbook file name into (category, invoice month).
pub fn classify(file_name: &str) -> (InvoiceCategory, String) {
    (invoice_category(file_name), invoice_month(file_name))
}

/// Determine the invoice category from the file name.
///
/// Case-insensitive substring match on the stem; anything matching neither
/// token is Unknown.
pub fn invoice_category(file_name: &str) -> InvoiceCategory {
    let name = stem(file_name).to_lowercase();
    if name.contains("hospital") {
        InvoiceCategory::Hospital
    } else if name.contains("professional") {
        InvoiceCategory::Professional
    } else {
        InvoiceCategory::Unknown
    }
}

/// Parse the billing month from the file name as `YYYY-MM-01`.
///
/// Only the first `<month> <year>` occurrence is used; the year is not
/// checked for plausibility. Returns an empty string when nothing matches.
pub fn invoice_month(file_name: &str) -> String {
    let name = stem(file_name);
    let Some(caps) = INVOICE_MONTH.captures(name) else {
        return String::new();
    };

    let month = match month_number(&caps[1].to_lowercase()) {
        Some(m) => m,
        None => return String::new(),
    };
    let year: i32 = match caps[2].parse() {
        Ok(y) => y,
        Err(_) => return String::new(),
    };

    format!("{:04}-{:02}-01", year, month)
}

fn stem(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
