// layout.rs — Where labels, values and the total live in a snapshot.
//
// The tracked sheet looks like this:
//
//   row 0: [DATE, TOTAL WEIGHTS, v1, v2, v3, ...]
//   row 1: [    , PARTS TYPE,    l1, l2, l3, ...]
//
// so values start at column 2 of row 0, labels at column 2 of row 1, and the
// aggregate total sits at row 0 column 1. Other layouts are not inferred;
// they need a different `SheetLayout`.

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Label reported for a change in the total cell.
pub const TOTAL_LABEL: &str = "TOTAL";

/// Fixed row/column offsets used to project a snapshot onto labeled values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetLayout {
    /// Row holding the per-label values and the total.
    pub value_row: usize,
    /// Row holding the labels.
    pub label_row: usize,
    /// First column of labels (and of values).
    pub first_label_column: usize,
    /// Column of the total cell within the value row.
    pub total_column: usize,
}

impl SheetLayout {
    /// The parts-weights sheet layout.
    pub const PARTS: SheetLayout = SheetLayout {
        value_row: 0,
        label_row: 1,
        first_label_column: 2,
        total_column: 1,
    };

    /// Cells of the value row from `first_label_column` onward.
    pub fn values<'a>(&self, snapshot: &'a Snapshot) -> &'a [String] {
        self.tail(snapshot, self.value_row)
    }

    /// Cells of the label row from `first_label_column` onward.
    pub fn labels<'a>(&self, snapshot: &'a Snapshot) -> &'a [String] {
        self.tail(snapshot, self.label_row)
    }

    /// The total cell, if the value row reaches that far.
    pub fn total<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a str> {
        snapshot.cell(self.value_row, self.total_column)
    }

    fn tail<'a>(&self, snapshot: &'a Snapshot, row: usize) -> &'a [String] {
        snapshot
            .row(row)
            .and_then(|cells| cells.get(self.first_label_column..))
            .unwrap_or(&[])
    }
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self::PARTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_layout_reads_offsets() {
        let snap = Snapshot::from_rows(&[
            &["2024-01-01", "100", "10", "20"],
            &["", "TYPE", "WINGS", "LAPS"],
            &[],
        ]);
        let layout = SheetLayout::PARTS;
        assert_eq!(layout.values(&snap), ["10", "20"]);
        assert_eq!(layout.labels(&snap), ["WINGS", "LAPS"]);
        assert_eq!(layout.total(&snap), Some("100"));
    }

    #[test]
    fn short_rows_yield_empty_slices() {
        let snap = Snapshot::from_rows(&[&["2024-01-01"], &["", "TYPE"], &[]]);
        let layout = SheetLayout::PARTS;
        assert!(layout.values(&snap).is_empty());
        assert!(layout.labels(&snap).is_empty());
        assert_eq!(layout.total(&snap), None);
    }

    #[test]
    fn missing_rows_yield_empty_slices() {
        let snap = Snapshot::default();
        assert!(SheetLayout::PARTS.values(&snap).is_empty());
        assert!(SheetLayout::PARTS.labels(&snap).is_empty());
    }
}
