//! Data row extraction and currency parsing.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::models::{Cell, SheetGrid};

use super::locator::TableBounds;

/// The three parsed amounts of one table row, before metadata is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineAmounts {
    pub charge_amount: Decimal,
    pub adjustment: Decimal,
    pub balance_due: Decimal,
}

/// Extract the amounts from every row between the table bounds.
///
/// A row is kept only when all three target cells parse as currency;
/// anything else is dropped without comment. Returns the kept rows and the
/// dropped-row count.
pub fn extract_rows(grid: &SheetGrid, bounds: &TableBounds) -> (Vec<LineAmounts>, usize) {
    let mut rows = Vec::new();
    let mut dropped = 0;

    for row_idx in bounds.data_start..bounds.data_end {
        let charge_amount = parse_cell(grid, row_idx, bounds.columns.charge_amount);
        let adjustment = parse_cell(grid, row_idx, bounds.columns.adjustment);
        let balance_due = parse_cell(grid, row_idx, bounds.columns.balance_due);

        match (charge_amount, adjustment, balance_due) {
            (Some(charge_amount), Some(adjustment), Some(balance_due)) => {
                rows.push(LineAmounts {
                    charge_amount,
                    adjustment,
                    balance_due,
                });
            }
            _ => dropped += 1,
        }
    }

    (rows, dropped)
}

fn parse_cell(grid: &SheetGrid, row: usize, col: usize) -> Option<Decimal> {
    grid.cell(row, col).and_then(parse_currency)
}

/// Parse a currency-formatted cell (`$1,234.56`) into a decimal amount.
///
/// Blank cells and anything that fails to parse after stripping the currency
/// symbol and thousands separators yield `None`.
pub fn parse_currency(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Empty | Cell::Bool(_) => None,
        Cell::Number(f) => Decimal::from_f64(*f),
        Cell::Text(s) => {
            let cleaned = s.trim().replace(['$', ','], "");
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
    }
}
