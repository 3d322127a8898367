// client.rs — SheetsClient: DataSource over the Sheets v4 REST API.
//
//   GET {base}/v4/spreadsheets/{id}/values/{sheet}!{range}
//
// The API omits trailing empty cells and empty trailing rows, so rows come
// back ragged; they are kept exactly as returned. Non-string cells (only
// possible with non-default render options) are stringified.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use pm_snapshot::{require_min_rows, DataSource, FetchError, Snapshot};

/// Production Sheets API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com";

/// How requests authenticate.
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    /// OAuth2 bearer token (e.g. minted from a service account).
    AccessToken(String),
    /// API key, for sheets readable by anyone with the link.
    ApiKey(String),
    /// No credentials.
    Anonymous,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads one range of one spreadsheet.
pub struct SheetsClient {
    client: reqwest::blocking::Client,
    base_url: String,
    spreadsheet_id: String,
    range: String,
    auth: SheetsAuth,
}

impl SheetsClient {
    /// `range` is a full A1 reference including the sheet, e.g. `parts!A1:H3`.
    pub fn new(
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
        auth: SheetsAuth,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let spreadsheet_id = spreadsheet_id.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable {
                source_id: spreadsheet_id.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id,
            range: range.into(),
            auth,
        })
    }

    /// Point the client at a different API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the request URL, percent-encoding the id and range.
    pub fn request_url(&self) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| FetchError::Unreachable {
            source_id: self.spreadsheet_id.clone(),
            message: format!("invalid base URL '{}': {}", self.base_url, e),
        })?;
        url.path_segments_mut()
            .map_err(|_| FetchError::Unreachable {
                source_id: self.spreadsheet_id.clone(),
                message: format!("base URL '{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.spreadsheet_id.as_str(),
                "values",
                self.range.as_str(),
            ]);
        if let SheetsAuth::ApiKey(key) = &self.auth {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }
}

impl DataSource for SheetsClient {
    fn source_id(&self) -> &str {
        &self.spreadsheet_id
    }

    fn fetch(&self) -> Result<Snapshot, FetchError> {
        tracing::info!(
            spreadsheet = %self.spreadsheet_id,
            range = %self.range,
            "fetching sheet data"
        );
        let url = self.request_url()?;

        let mut request = self.client.get(url);
        if let SheetsAuth::AccessToken(token) = &self.auth {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| FetchError::Unreachable {
            source_id: self.spreadsheet_id.clone(),
            // The URL can carry an API key.
            message: e.without_url().to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().map_err(|e| FetchError::Unreachable {
            source_id: self.spreadsheet_id.clone(),
            message: e.without_url().to_string(),
        })?;
        map_status(&self.spreadsheet_id, &self.range, status, &body)?;

        let snapshot = parse_value_range(&self.spreadsheet_id, &body)?;
        let snapshot = require_min_rows(&self.spreadsheet_id, snapshot)?;
        tracing::info!(rows = snapshot.row_count(), "sheet data fetched");
        Ok(snapshot)
    }
}

/// Translate a non-success HTTP status into the matching [`FetchError`].
pub fn map_status(source_id: &str, range: &str, status: u16, body: &str) -> Result<(), FetchError> {
    match status {
        200..=299 => Ok(()),
        401 | 403 => Err(FetchError::Auth {
            source_id: source_id.to_string(),
            message: api_error_message(body).unwrap_or_else(|| format!("HTTP {status}")),
        }),
        404 => Err(FetchError::NotFound {
            source_id: source_id.to_string(),
            range: range.to_string(),
        }),
        _ => Err(FetchError::Unreachable {
            source_id: source_id.to_string(),
            message: api_error_message(body)
                .map(|m| format!("HTTP {status}: {m}"))
                .unwrap_or_else(|| format!("HTTP {status}")),
        }),
    }
}

/// Decode a `ValueRange` body into a snapshot.
pub fn parse_value_range(source_id: &str, body: &str) -> Result<Snapshot, FetchError> {
    let range: ValueRange = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        source_id: source_id.to_string(),
        message: e.to_string(),
    })?;
    let rows = range
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_text).collect())
        .collect();
    Ok(Snapshot::new(rows))
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Pull `error.message` out of a Google API error body, if present.
fn api_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}
