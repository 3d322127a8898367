// extract.rs — LabeledValues: the label → value projection of a snapshot.
//
// Labels and values are paired by position. When the two rows disagree in
// length both are cut to the shorter one, keeping the leading entries. That
// loss is intentional: trailing unlabeled values (or value-less labels) are
// not tracked.

use serde::Serialize;

use crate::layout::SheetLayout;
use crate::snapshot::Snapshot;

/// Ordered label → value pairs extracted from one snapshot.
///
/// Order follows the sheet's columns and is what notifications display;
/// lookup by label is a linear scan since the row is short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabeledValues {
    entries: Vec<(String, String)>,
}

impl LabeledValues {
    /// Project `snapshot` onto `layout`. Never fails: a snapshot missing the
    /// label or value row yields an empty set.
    pub fn extract(snapshot: &Snapshot, layout: &SheetLayout) -> Self {
        let labels = layout.labels(snapshot);
        let values = layout.values(snapshot);

        if labels.len() != values.len() {
            tracing::warn!(
                labels = labels.len(),
                values = values.len(),
                "label/value count mismatch, truncating to the shorter row"
            );
        }

        let entries = labels
            .iter()
            .zip(values.iter())
            .map(|(label, value)| (label.clone(), value.clone()))
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(label, value)| (label.as_str(), value.as_str()))
    }

    /// Value for the first entry with this label.
    pub fn get(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(rows: &[&[&str]]) -> LabeledValues {
        LabeledValues::extract(&Snapshot::from_rows(rows), &SheetLayout::PARTS)
    }

    #[test]
    fn pairs_labels_with_values_in_column_order() {
        let lv = extract(&[
            &["2024-01-01", "100", "10", "20", "30"],
            &["", "TYPE", "WINGS", "LAPS", "BONES"],
            &[],
        ]);
        let pairs: Vec<_> = lv.iter().collect();
        assert_eq!(
            pairs,
            vec![("WINGS", "10"), ("LAPS", "20"), ("BONES", "30")]
        );
        assert_eq!(lv.get("LAPS"), Some("20"));
        assert_eq!(lv.get("TOTAL"), None);
    }

    #[test]
    fn extra_values_are_dropped() {
        let lv = extract(&[&["d", "100", "10", "20", "30"], &["", "TYPE", "WINGS"], &[]]);
        assert_eq!(lv.len(), 1);
        assert_eq!(lv.get("WINGS"), Some("10"));
    }

    #[test]
    fn extra_labels_are_dropped() {
        let lv = extract(&[&["d", "100", "10"], &["", "TYPE", "WINGS", "LAPS"], &[]]);
        assert_eq!(lv.labels().collect::<Vec<_>>(), vec!["WINGS"]);
        assert_eq!(lv.values().collect::<Vec<_>>(), vec!["10"]);
    }

    #[test]
    fn missing_rows_give_empty_set() {
        assert!(extract(&[]).is_empty());
        assert!(extract(&[&["d", "100", "10"]]).is_empty());
    }

    #[test]
    fn baseline_fixture_keeps_empty_value() {
        let lv = extract(&[&["2024-01-01", "100", "", "x"], &["", "TYPE", "WINGS"], &[]]);
        assert_eq!(lv.iter().collect::<Vec<_>>(), vec![("WINGS", "")]);
    }
}
