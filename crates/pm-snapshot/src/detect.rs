// detect.rs — ChangeDetector: positional comparison of two snapshots.
//
// The current snapshot's label row is authoritative for both sides. The
// previous snapshot contributes only its value row, which is padded with
// empty strings or truncated to the current value count so every label is
// compared 1:1 even after the sheet gained or lost columns.
//
// Values compare as trimmed strings: " 5 " == "5", but "5.0" != "5".
// A change in the total cell is appended last under TOTAL_LABEL.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CompareError;
use crate::extract::LabeledValues;
use crate::layout::{SheetLayout, TOTAL_LABEL};
use crate::snapshot::{Snapshot, MIN_ROWS};

/// One detected difference. `old` and `new` keep the untrimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub label: String,
    pub old: String,
    pub new: String,
}

impl Change {
    pub fn new(label: impl Into<String>, old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            old: old.into(),
            new: new.into(),
        }
    }

    /// True for the synthetic change emitted for the total cell.
    pub fn is_total(&self) -> bool {
        self.label == TOTAL_LABEL
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} → {}", self.label, self.old, self.new)
    }
}

/// Compares a previous snapshot against the current one.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    layout: SheetLayout,
}

impl ChangeDetector {
    pub fn new(layout: SheetLayout) -> Self {
        Self { layout }
    }

    /// Detect changes from `previous` to `current`.
    ///
    /// With no previous snapshot this is a baseline and returns no changes.
    /// Per-label changes come first in label order, then the total change.
    pub fn detect(
        &self,
        previous: Option<&Snapshot>,
        current: &Snapshot,
    ) -> Result<Vec<Change>, CompareError> {
        let Some(previous) = previous else {
            tracing::debug!("no previous snapshot, nothing to compare");
            return Ok(Vec::new());
        };
        self.check_shape("previous", previous)?;
        self.check_shape("current", current)?;

        let current_values = LabeledValues::extract(current, &self.layout);
        let previous_values = self.realign(previous, current_values.len());

        let mut changes = Vec::new();
        for ((label, new), old) in current_values.iter().zip(previous_values.iter()) {
            if old.trim() != new.trim() {
                tracing::debug!(label, old = %old, new, "value changed");
                changes.push(Change::new(label, *old, new));
            }
        }

        if let (Some(old), Some(new)) = (self.layout.total(previous), self.layout.total(current)) {
            if old.trim() != new.trim() {
                tracing::debug!(old, new, "total changed");
                changes.push(Change::new(TOTAL_LABEL, old, new));
            }
        }

        if changes.is_empty() {
            tracing::info!("no changes detected");
        } else {
            tracing::info!(count = changes.len(), "changes detected");
        }
        Ok(changes)
    }

    /// Previous value row, padded with "" or truncated to `len` entries.
    fn realign<'a>(&self, previous: &'a Snapshot, len: usize) -> Vec<&'a str> {
        let mut values: Vec<&str> = self
            .layout
            .values(previous)
            .iter()
            .map(String::as_str)
            .collect();
        if values.len() != len {
            tracing::warn!(
                previous = values.len(),
                current = len,
                "previous value count differs from current, realigning"
            );
        }
        values.resize(len, "");
        values
    }

    fn check_shape(&self, which: &'static str, snapshot: &Snapshot) -> Result<(), CompareError> {
        if snapshot.row_count() < MIN_ROWS {
            return Err(CompareError::MalformedSnapshot {
                which,
                rows: snapshot.row_count(),
                min: MIN_ROWS,
            });
        }
        if snapshot.row(self.layout.value_row).is_none() {
            return Err(CompareError::MissingValueRow {
                which,
                index: self.layout.value_row,
            });
        }
        Ok(())
    }
}
