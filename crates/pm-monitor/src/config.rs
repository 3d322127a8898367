// config.rs — MonitorConfig: every external setting, resolved once.
//
// Sources, later ones winning:
//   1. built-in defaults
//   2. an optional TOML file (`MonitorConfig::load`)
//   3. environment variables (`overlay_env`)
//
// `validate()` must pass before a run starts; a failure there is the only
// non-zero exit the binary produces.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use pm_snapshot::SheetLayout;

use crate::error::ConfigError;

pub const ENV_SPREADSHEET_ID: &str = "SPREADSHEET_ID";
pub const ENV_SHEET_NAME: &str = "SHEET_NAME";
pub const ENV_RANGE: &str = "SHEET_RANGE";
pub const ENV_WEBHOOK_URL: &str = "SPACE_WEBHOOK_URL";
pub const ENV_STATE_DIR: &str = "PM_STATE_DIR";
pub const ENV_WORKSPACE: &str = "GITHUB_WORKSPACE";
pub const ENV_ACCESS_TOKEN: &str = "SHEETS_ACCESS_TOKEN";
pub const ENV_API_KEY: &str = "SHEETS_API_KEY";
pub const ENV_TIMEZONE: &str = "PM_TIMEZONE";
pub const ENV_UNIT: &str = "PM_UNIT";

/// State lives in `<workspace>/.data` unless configured otherwise.
const STATE_SUBDIR: &str = ".data";

/// Settings for the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Spreadsheet to watch.
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Sheet (tab) inside the spreadsheet.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    /// A1 range inside the sheet.
    #[serde(default = "default_range")]
    pub range: String,

    /// Chat webhook receiving change notifications.
    #[serde(default)]
    pub webhook_url: String,

    /// Directory holding the persisted snapshot.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Bearer token for the Sheets API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// API key for the Sheets API (used when no token is set).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// IANA zone for notification timestamps.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// Unit appended to numeric values in notifications.
    #[serde(default = "default_unit")]
    pub unit: String,

    #[serde(default = "default_delivery_timeout_secs")]
    pub delivery_timeout_secs: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Where labels, values and the total sit in the range.
    #[serde(default)]
    pub layout: SheetLayout,
}

fn default_sheet_name() -> String {
    "parts".to_string()
}

fn default_range() -> String {
    "A1:H3".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(STATE_SUBDIR)
}

fn default_timezone() -> String {
    "Africa/Lagos".to_string()
}

fn default_unit() -> String {
    "kg".to_string()
}

fn default_delivery_timeout_secs() -> u64 {
    pm_notify::DEFAULT_DELIVERY_TIMEOUT.as_secs()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            sheet_name: default_sheet_name(),
            range: default_range(),
            webhook_url: String::new(),
            state_dir: default_state_dir(),
            access_token: None,
            api_key: None,
            timezone: default_timezone(),
            unit: default_unit(),
            delivery_timeout_secs: default_delivery_timeout_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            layout: SheetLayout::PARTS,
        }
    }
}

impl MonitorConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Self {
        Self::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Read a TOML config file (no environment overlay).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields with any non-empty value `lookup` returns.
    pub fn overlay_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_SPREADSHEET_ID) {
            self.spreadsheet_id = v;
        }
        if let Some(v) = get(ENV_SHEET_NAME) {
            self.sheet_name = v;
        }
        if let Some(v) = get(ENV_RANGE) {
            self.range = v;
        }
        if let Some(v) = get(ENV_WEBHOOK_URL) {
            self.webhook_url = v;
        }
        if let Some(v) = get(ENV_STATE_DIR) {
            self.state_dir = PathBuf::from(v);
        } else if let Some(workspace) = get(ENV_WORKSPACE) {
            if self.state_dir == default_state_dir() {
                self.state_dir = PathBuf::from(workspace).join(STATE_SUBDIR);
            }
        }
        if let Some(v) = get(ENV_ACCESS_TOKEN) {
            self.access_token = Some(v);
        }
        if let Some(v) = get(ENV_API_KEY) {
            self.api_key = Some(v);
        }
        if let Some(v) = get(ENV_TIMEZONE) {
            self.timezone = v;
        }
        if let Some(v) = get(ENV_UNIT) {
            self.unit = v;
        }
        self
    }

    /// Check every setting a run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "spreadsheet_id",
                env: ENV_SPREADSHEET_ID,
            });
        }
        if self.webhook_url.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "webhook_url",
                env: ENV_WEBHOOK_URL,
            });
        }
        if !(self.webhook_url.starts_with("https://") || self.webhook_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "webhook_url",
                reason: "must be an http(s) URL".to_string(),
            });
        }
        if self.sheet_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "sheet_name",
                reason: "must not be empty".to_string(),
            });
        }
        if self.range.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "range",
                reason: "must not be empty".to_string(),
            });
        }
        if self.delivery_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "delivery_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        self.tz()?;
        Ok(())
    }

    /// The notification time zone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| ConfigError::Invalid {
                field: "timezone",
                reason: e.to_string(),
            })
    }

    /// `sheet!range`, as the Sheets API expects it.
    pub fn full_range(&self) -> String {
        format!("{}!{}", self.sheet_name, self.range)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// A copy safe to print: secrets replaced, webhook query string hidden.
    pub fn masked(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| "***".to_string());
        let webhook_url = match self.webhook_url.split_once('?') {
            Some((base, _)) => format!("{base}?***"),
            None => self.webhook_url.clone(),
        };
        Self {
            webhook_url,
            access_token: mask(&self.access_token),
            api_key: mask(&self.api_key),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn valid() -> MonitorConfig {
        MonitorConfig::default().overlay_env(env(&[
            (ENV_SPREADSHEET_ID, "sheet-1"),
            (ENV_WEBHOOK_URL, "https://chat.example.com/hook?key=abc&token=def"),
        ]))
    }

    #[test]
    fn defaults_match_parts_sheet() {
        let config = MonitorConfig::default();
        assert_eq!(config.full_range(), "parts!A1:H3");
        assert_eq!(config.timezone, "Africa/Lagos");
        assert_eq!(config.unit, "kg");
        assert_eq!(config.delivery_timeout(), Duration::from_secs(10));
        assert_eq!(config.layout, SheetLayout::PARTS);
        assert_eq!(config.state_dir, PathBuf::from(".data"));
    }

    #[test]
    fn env_overlay_sets_required_fields() {
        let config = valid();
        assert_eq!(config.spreadsheet_id, "sheet-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_spreadsheet_id_is_reported() {
        let config = MonitorConfig::default()
            .overlay_env(env(&[(ENV_WEBHOOK_URL, "https://chat.example.com/hook")]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "spreadsheet_id",
                ..
            })
        ));
    }

    #[test]
    fn missing_webhook_is_reported() {
        let config = MonitorConfig::default().overlay_env(env(&[(ENV_SPREADSHEET_ID, "s")]));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing {
                field: "webhook_url",
                ..
            })
        ));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = MonitorConfig::default().overlay_env(env(&[(ENV_SPREADSHEET_ID, "  ")]));
        assert!(config.spreadsheet_id.is_empty());
    }

    #[test]
    fn workspace_env_moves_default_state_dir() {
        let config = MonitorConfig::default().overlay_env(env(&[(ENV_WORKSPACE, "/work")]));
        assert_eq!(config.state_dir, PathBuf::from("/work/.data"));

        let config = MonitorConfig::default().overlay_env(env(&[
            (ENV_WORKSPACE, "/work"),
            (ENV_STATE_DIR, "/var/lib/pm"),
        ]));
        assert_eq!(config.state_dir, PathBuf::from("/var/lib/pm"));
    }

    #[test]
    fn bad_timezone_is_invalid() {
        let mut config = valid();
        config.timezone = "Mars/Olympus".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "timezone",
                ..
            })
        ));
    }

    #[test]
    fn non_http_webhook_is_invalid() {
        let mut config = valid();
        config.webhook_url = "ftp://example.com".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "webhook_url",
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let mut config = valid();
        config.delivery_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_toml_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(
            &path,
            r#"
spreadsheet_id = "abc"
webhook_url = "https://chat.example.com/hook"
state_dir = "/tmp/pm"
unit = "lb"

[layout]
value_row = 0
label_row = 1
first_label_column = 3
total_column = 2
"#,
        )
        .unwrap();

        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.spreadsheet_id, "abc");
        assert_eq!(config.unit, "lb");
        assert_eq!(config.sheet_name, "parts");
        assert_eq!(config.layout.first_label_column, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = MonitorConfig::load(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn load_bad_toml_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("monitor.toml");
        fs::write(&path, "delivery_timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            MonitorConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn masked_hides_secrets() {
        let mut config = valid();
        config.api_key = Some("secret".to_string());
        let masked = config.masked();
        assert_eq!(masked.webhook_url, "https://chat.example.com/hook?***");
        assert_eq!(masked.api_key.as_deref(), Some("***"));
        assert!(masked.access_token.is_none());
        assert_eq!(masked.spreadsheet_id, config.spreadsheet_id);
    }
}
