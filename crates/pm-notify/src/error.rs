// error.rs — Error types for notification delivery.

use thiserror::Error;

/// Errors a [`NotificationTransport`](crate::NotificationTransport) can return.
///
/// Delivery failures never abort a run; the monitor logs them and still
/// persists the current snapshot.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be built or sent.
    #[error("webhook request failed: {0}")]
    Request(String),

    /// The endpoint did not answer within the delivery timeout.
    #[error("webhook timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The endpoint answered with a non-success status.
    #[error("webhook returned HTTP {status}")]
    Status { status: u16 },
}
