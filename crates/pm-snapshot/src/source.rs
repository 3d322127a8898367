// source.rs — DataSource: where fresh snapshots come from.

use crate::error::FetchError;
use crate::snapshot::{Snapshot, MIN_ROWS};

/// A producer of fresh snapshots (the spreadsheet API in production, an
/// in-memory fixture in tests).
///
/// `fetch` is a single blocking call bounded by the implementation's own
/// timeout.
pub trait DataSource {
    /// Identifier used in log lines and errors.
    fn source_id(&self) -> &str;

    /// Fetch the current snapshot. Implementations must reject snapshots
    /// with fewer than [`MIN_ROWS`] rows (see [`require_min_rows`]).
    fn fetch(&self) -> Result<Snapshot, FetchError>;
}

/// Reject a fetched snapshot that is too short to compare.
pub fn require_min_rows(source_id: &str, snapshot: Snapshot) -> Result<Snapshot, FetchError> {
    if snapshot.is_valid() {
        Ok(snapshot)
    } else {
        Err(FetchError::Malformed {
            source_id: source_id.to_string(),
            expected: MIN_ROWS,
            actual: snapshot.row_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_snapshot_is_malformed() {
        let err = require_min_rows("sheet", Snapshot::from_rows(&[&["a"], &["b"]])).unwrap_err();
        assert!(matches!(
            err,
            FetchError::Malformed {
                expected: 3,
                actual: 2,
                ..
            }
        ));
    }

    #[test]
    fn valid_snapshot_passes_through() {
        let snap = Snapshot::from_rows(&[&["a"], &["b"], &[]]);
        assert_eq!(require_min_rows("sheet", snap.clone()).unwrap(), snap);
    }
}
