//! Grouped rollups over the combined billing table.
//!
//! Two independent summaries: study-level (by study identity, month, and
//! category) and account-level (by KFS account, category, and month). Both
//! are pure functions over the combined rows; output ordering follows the
//! group keys so repeated runs produce identical tables.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::models::LineItem;

/// One study-level summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummaryRow {
    pub study_name: String,
    pub study_code: String,
    pub kfs_no: String,
    pub irb_no: String,
    pub invoice_month: String,
    pub invoice_category: String,
    pub charge_amount: Decimal,
    pub adjustment: Decimal,
    pub balance_due: Decimal,
}

/// One account-level summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummaryRow {
    pub kfs_no: String,
    pub invoice_category: String,
    pub invoice_month: String,
    pub charge_amount: Decimal,
    pub adjustment: Decimal,
    pub balance_due: Decimal,
}

/// Running totals for the three amount columns.
#[derive(Debug, Clone, Copy, Default)]
struct AmountTotals {
    charge_amount: Decimal,
    adjustment: Decimal,
    balance_due: Decimal,
}

impl AmountTotals {
    fn add(&mut self, row: &LineItem) {
        self.charge_amount += row.charge_amount;
        self.adjustment += row.adjustment;
        self.balance_due += row.balance_due;
    }
}

/// Group key coercion: missing values and surrounding whitespace collapse so
/// rows differing only in padding land in the same group.
fn key(value: &str) -> String {
    value.trim().to_string()
}

/// Study-level rollup: group by study name, study code, KFS no, IRB no,
/// invoice month, and invoice category; sum the three amounts.
pub fn study_level_summary(rows: &[LineItem]) -> Vec<StudySummaryRow> {
    if rows.is_empty() {
        warn!("Study summary requested on an empty combined table");
        return Vec::new();
    }

    let mut groups: BTreeMap<(String, String, String, String, String, String), AmountTotals> =
        BTreeMap::new();

    for row in rows {
        let group_key = (
            key(&row.study_name),
            key(&row.study_code),
            key(&row.kfs_no),
            key(&row.irb_no),
            key(&row.invoice_month),
            key(&row.invoice_category),
        );
        groups.entry(group_key).or_default().add(row);
    }

    debug!("Study summary: {} groups from {} rows", groups.len(), rows.len());

    groups
        .into_iter()
        .map(
            |((study_name, study_code, kfs_no, irb_no, invoice_month, invoice_category), totals)| {
                StudySummaryRow {
                    study_name,
                    study_code,
                    kfs_no,
                    irb_no,
                    invoice_month,
                    invoice_category,
                    charge_amount: totals.charge_amount,
                    adjustment: totals.adjustment,
                    balance_due: totals.balance_due,
                }
            },
        )
        .collect()
}

/// Account-level rollup: group by KFS no, invoice category, and invoice
/// month; sum the three amounts.
pub fn account_level_summary(rows: &[LineItem]) -> Vec<AccountSummaryRow> {
    if rows.is_empty() {
        warn!("Account summary requested on an empty combined table");
        return Vec::new();
    }

    let mut groups: BTreeMap<(String, String, String), AmountTotals> = BTreeMap::new();

    for row in rows {
        let group_key = (
            key(&row.kfs_no),
            key(&row.invoice_category),
            key(&row.invoice_month),
        );
        groups.entry(group_key).or_default().add(row);
    }

    debug!(
        "Account summary: {} groups from {} rows",
        groups.len(),
        rows.len()
    );

    groups
        .into_iter()
        .map(|((kfs_no, invoice_category, invoice_month), totals)| AccountSummaryRow {
            kfs_no,
            invoice_category,
            invoice_month,
            charge_amount: totals.charge_amount,
            adjustment: totals.adjustment,
            balance_due: totals.balance_due,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(kfs_no: &str, study_name: &str, charge: i64) -> LineItem {
        LineItem {
            source_workbook: "a.xlsx".to_string(),
            source_sheet: "Bill 1".to_string(),
            invoice_category: "hospital".to_string(),
            invoice_month: "2025-05-01".to_string(),
            pi: String::new(),
            study_name: study_name.to_string(),
            study_code: String::new(),
            irb_no: String::new(),
            kfs_no: kfs_no.to_string(),
            charge_amount: Decimal::new(charge * 100, 2),
            adjustment: Decimal::new(-500, 2),
            balance_due: Decimal::new(charge * 100 - 500, 2),
        }
    }

    #[test]
    fn test_account_summary_sums_shared_key() {
        let rows = vec![row("123", "Cardiac Trial", 100), row("123", "Cardiac Trial", 200)];
        let summary = account_level_summary(&rows);

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].kfs_no, "123");
        assert_eq!(summary[0].invoice_category, "hospital");
        assert_eq!(summary[0].invoice_month, "2025-05-01");
        assert_eq!(summary[0].charge_amount, Decimal::new(30000, 2));
        assert_eq!(summary[0].adjustment, Decimal::new(-1000, 2));
    }

    #[test]
    fn test_account_summary_splits_differing_keys() {
        let mut other_month = row("123", "Cardiac Trial", 50);
        other_month.invoice_month = "2025-06-01".to_string();
        let rows = vec![row("123", "Cardiac Trial", 100), other_month];

        let summary = account_level_summary(&rows);
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_study_summary_groups_on_study_fields() {
        let rows = vec![
            row("123", "Cardiac Trial", 100),
            row("123", "Cardiac Trial", 50),
            row("123", "Oncology Study", 25),
        ];
        let summary = study_level_summary(&rows);

        assert_eq!(summary.len(), 2);
        // BTreeMap ordering: "Cardiac Trial" before "Oncology Study".
        assert_eq!(summary[0].study_name, "Cardiac Trial");
        assert_eq!(summary[0].charge_amount, Decimal::new(15000, 2));
        assert_eq!(summary[1].study_name, "Oncology Study");
    }

    #[test]
    fn test_keys_are_trimmed_before_grouping() {
        let mut padded = row("123", "Cardiac Trial", 100);
        padded.kfs_no = "  123  ".to_string();
        let rows = vec![row("123", "Cardiac Trial", 100), padded];

        let summary = account_level_summary(&rows);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].charge_amount, Decimal::new(20000, 2));
    }

    #[test]
    fn test_empty_input_yields_empty_summaries() {
        assert!(study_level_summary(&[]).is_empty());
        assert!(account_level_summary(&[]).is_empty());
    }

    #[test]
    fn test_summary_order_is_deterministic() {
        let rows = vec![
            row("999", "Zeta Study", 10),
            row("111", "Alpha Study", 10),
            row("555", "Mid Study", 10),
        ];
        let first = account_level_summary(&rows);
        let second = account_level_summary(&rows);

        assert_eq!(first, second);
        assert_eq!(first[0].kfs_no, "111");
        assert_eq!(first[2].kfs_no, "999");
    }
}
