//! # pm-connector-sheets
//!
//! Google Sheets data source for the parts monitor.
//!
//! [`SheetsClient`] reads one A1 range through the Sheets v4
//! `spreadsheets.values.get` endpoint and returns it as a
//! [`Snapshot`](pm_snapshot::Snapshot). Obtaining an access token is left to
//! the caller; the client accepts a ready bearer token or an API key.

pub mod client;

pub use client::{SheetsAuth, SheetsClient, DEFAULT_BASE_URL};
