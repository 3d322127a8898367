// error.rs — Error types for fetching and comparing snapshots.

use thiserror::Error;

/// Errors a [`DataSource`](crate::DataSource) can return.
///
/// Any of these is fatal for the current run: nothing is read, compared
/// or written afterwards.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source rejected our credentials.
    #[error("authentication failed for source '{source_id}': {message}")]
    Auth { source_id: String, message: String },

    /// The source or range does not exist.
    #[error("source '{source_id}' range '{range}' not found")]
    NotFound { source_id: String, range: String },

    /// The source answered, but with too few rows to be a snapshot.
    #[error("malformed snapshot from '{source_id}': expected at least {expected} rows, got {actual}")]
    Malformed {
        source_id: String,
        expected: usize,
        actual: usize,
    },

    /// The source could not be reached (network, timeout, server error).
    #[error("source '{source_id}' unreachable: {message}")]
    Unreachable { source_id: String, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response from '{source_id}': {message}")]
    Decode { source_id: String, message: String },
}

/// Errors raised while comparing two snapshots.
///
/// The monitor treats every variant as "zero changes" for the run and
/// still persists the current snapshot.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompareError {
    /// A snapshot has no row at the layout's value-row index.
    #[error("{which} snapshot has no value row at index {index}")]
    MissingValueRow { which: &'static str, index: usize },

    /// A snapshot has fewer rows than a comparable snapshot needs.
    #[error("{which} snapshot has {rows} rows, need at least {min}")]
    MalformedSnapshot {
        which: &'static str,
        rows: usize,
        min: usize,
    },
}
