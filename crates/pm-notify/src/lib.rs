//! # pm-notify
//!
//! Turns a change list into a chat message and delivers it.
//!
//! - [`NotificationFormatter`] — pure rendering of changes + current values
//! - [`Clock`] — where the message timestamp comes from
//! - [`NotificationTransport`] — delivery seam; [`WebhookTransport`] posts to
//!   a chat webhook, [`LogTransport`] only logs (dry runs)

pub mod clock;
pub mod error;
pub mod format;
pub mod transport;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::TransportError;
pub use format::{format_value, is_plain_decimal, NotificationFormatter};
pub use transport::{
    check_status, LogTransport, NotificationTransport, UnavailableTransport, WebhookTransport,
    DEFAULT_DELIVERY_TIMEOUT,
};
