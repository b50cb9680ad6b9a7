//! Metadata scanning above the table header.
//!
//! Sheets carry label/value pairs (PI, study name, account numbers) in the
//! rows above the billing table, in category-specific columns. Labels vary
//! in punctuation ("KFS NO.:", "KFS NO:") so matching runs on a normalized
//! form.

use tracing::debug;

use crate::models::{InvoiceCategory, Metadata, MetadataField, SheetGrid};

/// Scan the rows above `header_start` for expected label/value pairs and
/// record them on the metadata.
///
/// When the same label appears on several rows, the last matching row wins.
/// Fields never matched keep their empty-string default.
pub fn scan_labelled_fields(
    grid: &SheetGrid,
    category: InvoiceCategory,
    header_start: usize,
    metadata: &mut Metadata,
) {
    let (label_col, value_col) = category.metadata_columns();
    let expected: Vec<(String, MetadataField)> = category
        .expected_fields()
        .iter()
        .map(|f| (normalize_label(f.label()), *f))
        .collect();

    for row_idx in 0..header_start {
        let label = grid
            .cell(row_idx, label_col)
            .map(|c| normalize_label(&c.display()))
            .unwrap_or_default();
        if label.is_empty() {
            continue;
        }

        let Some((_, field)) = expected.iter().find(|(norm, _)| *norm == label) else {
            continue;
        };

        let value = grid
            .cell(row_idx, value_col)
            .map(|c| c.display())
            .unwrap_or_default();
        metadata.set_field(*field, value);
    }

    debug!(
        "Scanned metadata in sheet '{}' above row {}",
        grid.name(),
        header_start
    );
}

/// Normalize a metadata label for matching: trim, lowercase, then strip
/// trailing non-alphanumeric characters one at a time, so "KFS NO.:" and
/// "KFS NO" compare equal.
pub fn normalize_label(label: &str) -> String {
    let mut s = label.trim().to_lowercase();
    while s
        .chars()
        .last()
        .is_some_and(|c| !c.is_alphanumeric())
    {
        s.pop();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cell, MetadataField};
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_normalize_label_strips_trailing_punctuation() {
        assert_eq!(normalize_label("KFS NO.:"), "kfs no");
        assert_eq!(normalize_label("KFS NO"), "kfs no");
        assert_eq!(normalize_label("  Study Name:  "), "study name");
        assert_eq!(normalize_label("IRB NO.: "), "irb no");
    }

    #[test]
    fn test_hospital_labels_in_column_b() {
        let grid = SheetGrid::new(
            "Bill 1",
            vec![
                vec![Cell::Empty, text("STUDY NAME:"), text("  Cardiac Trial  ")],
                vec![Cell::Empty, text("KFS NO.:"), text("1234567")],
                vec![Cell::Empty, text("UNRELATED:"), text("ignored")],
            ],
        );

        let mut metadata = Metadata::default();
        scan_labelled_fields(&grid, InvoiceCategory::Hospital, 3, &mut metadata);

        assert_eq!(metadata.study_name, "Cardiac Trial");
        assert_eq!(metadata.kfs_no, "1234567");
        assert_eq!(metadata.pi, "");
        assert_eq!(metadata.irb_no, "");
    }

    #[test]
    fn test_professional_labels_in_column_a() {
        let grid = SheetGrid::new(
            "Pro Bill",
            vec![
                vec![text("PI:"), text("Dr. Reyes")],
                vec![text("STUDY CODE"), text("SC-204")],
            ],
        );

        let mut metadata = Metadata::default();
        scan_labelled_fields(&grid, InvoiceCategory::Professional, 2, &mut metadata);

        assert_eq!(metadata.pi, "Dr. Reyes");
        assert_eq!(metadata.study_code, "SC-204");
    }

    #[test]
    fn test_duplicate_label_last_row_wins() {
        let grid = SheetGrid::new(
            "Bill 1",
            vec![
                vec![Cell::Empty, text("KFS NO"), text("1111111")],
                vec![Cell::Empty, text("KFS NO.:"), text("2222222")],
            ],
        );

        let mut metadata = Metadata::default();
        scan_labelled_fields(&grid, InvoiceCategory::Hospital, 2, &mut metadata);

        assert_eq!(metadata.kfs_no, "2222222");
    }

    #[test]
    fn test_blank_value_recorded_as_empty() {
        let grid = SheetGrid::new(
            "Bill 1",
            vec![vec![Cell::Empty, text("IRB NO:"), Cell::Empty]],
        );

        let mut metadata = Metadata::default();
        metadata.set_field(MetadataField::IrbNo, "stale".to_string());
        scan_labelled_fields(&grid, InvoiceCategory::Hospital, 1, &mut metadata);

        assert_eq!(metadata.irb_no, "");
    }

    #[test]
    fn test_unknown_category_matches_union_in_hospital_columns() {
        let grid = SheetGrid::new(
            "Mystery",
            vec![
                vec![Cell::Empty, text("STUDY CODE:"), text("SC-99")],
                vec![Cell::Empty, text("KFS NO:"), text("7654321")],
            ],
        );

        let mut metadata = Metadata::default();
        scan_labelled_fields(&grid, InvoiceCategory::Unknown, 2, &mut metadata);

        assert_eq!(metadata.study_code, "SC-99");
        assert_eq!(metadata.kfs_no, "7654321");
    }

    #[test]
    fn test_numeric_label_cell_does_not_match() {
        let grid = SheetGrid::new(
            "Bill 1",
            vec![vec![Cell::Empty, Cell::Number(42.0), text("value")]],
        );

        let mut metadata = Metadata::default();
        scan_labelled_fields(&grid, InvoiceCategory::Hospital, 1, &mut metadata);
        assert!(metadata.fields_all_blank());
    }
}
