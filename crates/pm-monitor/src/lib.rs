//! # pm-monitor
//!
//! One pass of the parts monitor: fetch the sheet, load the previous
//! snapshot, compare, notify on changes, persist.
//!
//! ## Key components
//!
//! - [`MonitorConfig`] — settings built once at startup (TOML file and/or
//!   environment) and passed by reference
//! - [`Monitor`] — the run state machine (Fetching → LoadingPrevious →
//!   BaselineInit | Comparing → Notifying? → Persisting → Done)
//! - [`RunReport`] — what a pass did, for logging and tests
//!
//! A run never fails: fetch errors end it early without touching state,
//! every later failure is logged and the current snapshot is still saved.

pub mod config;
pub mod error;
pub mod run;

pub use config::MonitorConfig;
pub use error::ConfigError;
pub use run::{Monitor, RunOutcome, RunPhase, RunReport};
