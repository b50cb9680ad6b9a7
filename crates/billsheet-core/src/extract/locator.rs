//! Table location within a raw sheet grid.
//!
//! Billing sheets put free-form metadata above a line-item table whose
//! position and column order vary by export. The locator scans a bounded
//! window for the header row(s) naming the three target columns, then walks
//! forward to find where the data ends.

use tracing::debug;

use crate::models::{Cell, ExtractConfig, InvoiceCategory, SheetGrid, TARGET_COLUMNS};

/// Column indices of the three target fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub charge_amount: usize,
    pub adjustment: usize,
    pub balance_due: usize,
}

/// Located table bounds within a grid.
#[derive(Debug, Clone, Copy)]
pub struct TableBounds {
    /// First row of the header band.
    pub header_start: usize,

    /// First data row (header start + header row count).
    pub data_start: usize,

    /// One past the last data row.
    pub data_end: usize,

    /// Target column indices.
    pub columns: ColumnMap,
}

/// Locate the line-item table in a grid, or `None` if no candidate header
/// row maps all three target columns.
pub fn locate_table(
    grid: &SheetGrid,
    category: InvoiceCategory,
    config: &ExtractConfig,
) -> Option<TableBounds> {
    let (header_start, data_start, columns) = find_header(grid, category, config)?;
    let data_end = find_data_end(grid, data_start, config);

    debug!(
        "Located table in sheet '{}': header row {}, data rows {}..{}",
        grid.name(),
        header_start,
        data_start,
        data_end
    );

    Some(TableBounds {
        header_start,
        data_start,
        data_end,
        columns,
    })
}

/// Scan the window for a header band mapping all three target columns.
///
/// The header row count is fixed by category (professional tables use a
/// 2-row header with merged cells); Unknown tries 1-row headers first, then
/// 2-row as a fallback. Within a band each target name is claimed at most
/// once, first match wins, and the first candidate row satisfying all three
/// is accepted without looking further down.
fn find_header(
    grid: &SheetGrid,
    category: InvoiceCategory,
    config: &ExtractConfig,
) -> Option<(usize, usize, ColumnMap)> {
    let targets: Vec<String> = TARGET_COLUMNS.iter().map(|t| t.to_lowercase()).collect();

    for &header_rows in category.header_row_attempts() {
        let upper = (grid.row_count().saturating_sub(header_rows) + 1).min(config.scan_end_row);

        for start in config.scan_start_row..upper {
            let mut found: [Option<usize>; 3] = [None; 3];

            for col in 0..grid.width() {
                for r in 0..header_rows {
                    let Some(cell) = grid.cell(start + r, col) else {
                        continue;
                    };
                    let normalized = cell.display().to_lowercase();
                    for (slot, target) in found.iter_mut().zip(&targets) {
                        if slot.is_none() && normalized == *target {
                            *slot = Some(col);
                            break;
                        }
                    }
                }
            }

            if let [Some(charge_amount), Some(adjustment), Some(balance_due)] = found {
                let columns = ColumnMap {
                    charge_amount,
                    adjustment,
                    balance_due,
                };
                return Some((start, start + header_rows, columns));
            }
        }
    }

    None
}

/// Find the first row index that ends the data table.
///
/// The table ends at the first row containing an end-marker substring or
/// the first completely blank row, whichever comes first; otherwise it runs
/// to the end of the grid.
fn find_data_end(grid: &SheetGrid, data_start: usize, config: &ExtractConfig) -> usize {
    for row_idx in data_start..grid.row_count() {
        if let Some(row) = grid.row(row_idx) {
            let has_marker = row.iter().any(|cell| match cell {
                Cell::Text(s) => {
                    let upper = s.trim().to_uppercase();
                    config.end_markers.iter().any(|m| upper.contains(m))
                }
                _ => false,
            });
            if has_marker {
                return row_idx;
            }
        }

        if grid.is_row_blank(row_idx) {
            return row_idx;
        }
    }
    grid.row_count()
}
