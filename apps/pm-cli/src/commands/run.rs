// run.rs — `parts-monitor run`: one monitoring pass.
//
// Configuration problems fail the command. Once the pass starts, every
// outcome (including fetch and delivery failures, and clients that cannot be
// built) exits successfully so a scheduler never alerts on our behalf; the
// logs carry the details.

use pm_connector_sheets::{SheetsAuth, SheetsClient};
use pm_monitor::{Monitor, MonitorConfig};
use pm_notify::{
    LogTransport, NotificationTransport, SystemClock, TransportError, UnavailableTransport,
    WebhookTransport,
};

pub fn execute(config: &MonitorConfig, dry_run: bool, json: bool) -> anyhow::Result<()> {
    config.validate()?;

    let source = match SheetsClient::new(
        &config.spreadsheet_id,
        config.full_range(),
        sheets_auth(config),
        config.fetch_timeout(),
    ) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "fetch failed, leaving state untouched");
            return Ok(());
        }
    };
    let transport = build_transport(config, dry_run);

    let monitor = Monitor::new(config, source, transport, SystemClock)?;
    let report = monitor.run_once();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

/// Pick the delivery transport. A webhook client that cannot be built turns
/// into a transport that fails every delivery, so the pass still persists.
fn build_transport(config: &MonitorConfig, dry_run: bool) -> Box<dyn NotificationTransport> {
    if dry_run {
        return Box::new(LogTransport);
    }
    match WebhookTransport::new(&config.webhook_url, config.delivery_timeout()) {
        Ok(transport) => Box::new(transport),
        Err(e) => {
            tracing::warn!(error = %e, "webhook client unavailable, notifications will fail");
            let reason = match e {
                TransportError::Request(reason) => reason,
                other => other.to_string(),
            };
            Box::new(UnavailableTransport::new(reason))
        }
    }
}

fn sheets_auth(config: &MonitorConfig) -> SheetsAuth {
    if let Some(token) = &config.access_token {
        SheetsAuth::AccessToken(token.clone())
    } else if let Some(key) = &config.api_key {
        SheetsAuth::ApiKey(key.clone())
    } else {
        tracing::warn!("no Sheets credentials configured, sending unauthenticated requests");
        SheetsAuth::Anonymous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MonitorConfig {
        MonitorConfig {
            spreadsheet_id: "sheet-1".to_string(),
            webhook_url: "https://chat.example.com/hook".to_string(),
            ..MonitorConfig::default()
        }
    }

    #[test]
    fn dry_run_uses_log_transport() {
        assert_eq!(build_transport(&config(), true).name(), "log");
    }

    #[test]
    fn live_run_uses_webhook_transport() {
        assert_eq!(build_transport(&config(), false).name(), "webhook");
    }

    #[test]
    fn token_wins_over_api_key() {
        let config = MonitorConfig {
            access_token: Some("tok".to_string()),
            api_key: Some("key".to_string()),
            ..config()
        };
        assert!(matches!(sheets_auth(&config), SheetsAuth::AccessToken(t) if t == "tok"));
    }

    #[test]
    fn missing_credentials_fall_back_to_anonymous() {
        assert!(matches!(sheets_auth(&config()), SheetsAuth::Anonymous));
    }
}
