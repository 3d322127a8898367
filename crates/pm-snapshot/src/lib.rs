//! # pm-snapshot
//!
//! Snapshot model and change detection for the parts monitor.
//!
//! A [`Snapshot`] is one fetched copy of the tracked spreadsheet range: an
//! ordered list of rows, each an ordered list of text cells. The
//! [`SheetLayout`] says where the labels, values and total live;
//! [`LabeledValues`] projects a snapshot onto that layout, and
//! [`ChangeDetector`] compares two snapshots position by position.
//!
//! ## Quick Example
//!
//! ```rust
//! use pm_snapshot::{ChangeDetector, Snapshot};
//!
//! let previous = Snapshot::from_rows(&[&["d", "100", "10"], &["", "TYPE", "WINGS"], &[]]);
//! let current = Snapshot::from_rows(&[&["d", "100", "15"], &["", "TYPE", "WINGS"], &[]]);
//!
//! let changes = ChangeDetector::default().detect(Some(&previous), &current).unwrap();
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].label, "WINGS");
//! ```

pub mod detect;
pub mod error;
pub mod extract;
pub mod layout;
pub mod snapshot;
pub mod source;

pub use detect::{Change, ChangeDetector};
pub use error::{CompareError, FetchError};
pub use extract::LabeledValues;
pub use layout::{SheetLayout, TOTAL_LABEL};
pub use snapshot::{Snapshot, MIN_ROWS};
pub use source::{require_min_rows, DataSource};
