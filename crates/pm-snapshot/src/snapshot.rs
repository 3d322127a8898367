// snapshot.rs — Snapshot: one fetched copy of the tracked range.
//
// A snapshot is exactly what the data source returned: rows of text cells,
// ragged where the source omitted trailing empty cells. It is never mutated
// after fetch; it either becomes the persisted state or is dropped.

use serde::{Deserialize, Serialize};

/// Minimum number of rows for a snapshot to be stored or compared.
pub const MIN_ROWS: usize = 3;

/// An ordered sequence of rows, each an ordered sequence of text cells.
///
/// Serializes as a bare `[[String]]` so the persisted form mirrors what the
/// source returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    rows: Vec<Vec<String>>,
}

impl Snapshot {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a snapshot from string slices (handy for fixtures).
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[String]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// True when the snapshot has at least [`MIN_ROWS`] rows.
    pub fn is_valid(&self) -> bool {
        self.rows.len() >= MIN_ROWS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_nested_arrays() {
        let snap = Snapshot::from_rows(&[&["a", "b"], &[], &["c"]]);
        let json = serde_json::to_string(&snap).unwrap();
        assert_eq!(json, r#"[["a","b"],[],["c"]]"#);
    }

    #[test]
    fn cell_lookup_handles_ragged_rows() {
        let snap = Snapshot::from_rows(&[&["a", "b"], &[], &["c"]]);
        assert_eq!(snap.cell(0, 1), Some("b"));
        assert_eq!(snap.cell(1, 0), None);
        assert_eq!(snap.cell(7, 0), None);
    }

    #[test]
    fn validity_requires_three_rows() {
        assert!(!Snapshot::from_rows(&[&["a"], &["b"]]).is_valid());
        assert!(Snapshot::from_rows(&[&["a"], &["b"], &[]]).is_valid());
    }
}
