// error.rs — Configuration errors.
//
// These are the only errors that stop the process with a failure status:
// they happen before a run starts.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building or validating [`MonitorConfig`](crate::MonitorConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or empty.
    #[error("missing required setting '{field}' (set {env})")]
    Missing {
        field: &'static str,
        env: &'static str,
    },

    /// A setting is present but unusable.
    #[error("invalid setting '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
