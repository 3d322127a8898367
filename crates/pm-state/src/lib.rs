//! # pm-state
//!
//! Durable storage for the last-seen snapshot.
//!
//! The [`StateStore`] keeps exactly one snapshot in a JSON file under a
//! configured directory. Loading is forgiving (anything unreadable is "no
//! previous state"); saving is atomic (write to a temp file, fsync, rename).

pub mod error;
pub mod store;

pub use error::{PersistError, StateError};
pub use store::{PersistedState, SaveOutcome, StateStore, STATE_FILE_NAME};
