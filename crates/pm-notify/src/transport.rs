// transport.rs — Notification delivery.
//
// The monitor hands a rendered message to a NotificationTransport exactly
// once per run with changes. Delivery is a single blocking call bounded by a
// short timeout; a failure is reported back and logged by the caller, never
// retried here.

use std::time::Duration;

use serde::Serialize;

use crate::error::TransportError;

/// Default timeout for a webhook POST.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers a rendered message somewhere a human will see it.
pub trait NotificationTransport {
    /// Deliver `message`. One attempt, bounded by the transport's timeout.
    fn deliver(&self, message: &str) -> Result<(), TransportError>;

    /// Transport name (for log lines).
    fn name(&self) -> &str;
}

impl<T: NotificationTransport + ?Sized> NotificationTransport for Box<T> {
    fn deliver(&self, message: &str) -> Result<(), TransportError> {
        (**self).deliver(message)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": message}` to a chat webhook URL.
pub struct WebhookTransport {
    client: reqwest::blocking::Client,
    url: String,
    timeout: Duration,
}

impl WebhookTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }
}

impl NotificationTransport for WebhookTransport {
    fn deliver(&self, message: &str) -> Result<(), TransportError> {
        tracing::info!(bytes = message.len(), "sending webhook request");
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text: message })
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout {
                        secs: self.timeout.as_secs(),
                    }
                } else {
                    // Webhook URLs embed credentials; keep them out of logs.
                    TransportError::Request(e.without_url().to_string())
                }
            })?;

        let status = response.status().as_u16();
        check_status(status)?;
        tracing::info!(status, "webhook delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Map an HTTP status to a delivery result.
pub fn check_status(status: u16) -> Result<(), TransportError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(TransportError::Status { status })
    }
}

/// Logs the message instead of sending it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl NotificationTransport for LogTransport {
    fn deliver(&self, message: &str) -> Result<(), TransportError> {
        tracing::info!(text = message, "dry run: notification not sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Stands in for a transport that could not be set up.
///
/// Every delivery fails with the setup error, so the run still compares and
/// persists and the failure shows up as an ordinary delivery failure.
#[derive(Debug, Clone)]
pub struct UnavailableTransport {
    reason: String,
}

impl UnavailableTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl NotificationTransport for UnavailableTransport {
    fn deliver(&self, _message: &str) -> Result<(), TransportError> {
        Err(TransportError::Request(self.reason.clone()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_pass() {
        assert!(check_status(200).is_ok());
        assert!(check_status(204).is_ok());
    }

    #[test]
    fn error_statuses_fail() {
        assert!(matches!(
            check_status(500),
            Err(TransportError::Status { status: 500 })
        ));
        assert!(matches!(
            check_status(302),
            Err(TransportError::Status { status: 302 })
        ));
    }

    #[test]
    fn payload_shape() {
        let json = serde_json::to_string(&WebhookPayload { text: "hi" }).unwrap();
        assert_eq!(json, r#"{"text":"hi"}"#);
    }

    #[test]
    fn boxed_transport_delegates() {
        let boxed: Box<dyn NotificationTransport> = Box::new(LogTransport);
        assert!(boxed.deliver("hello").is_ok());
        assert_eq!(boxed.name(), "log");
    }

    #[test]
    fn log_transport_always_succeeds() {
        assert!(LogTransport.deliver("hello").is_ok());
        assert_eq!(LogTransport.name(), "log");
    }

    #[test]
    fn unavailable_transport_fails_with_setup_reason() {
        let transport = UnavailableTransport::new("tls backend missing");
        let err = transport.deliver("hello").unwrap_err();
        assert!(matches!(&err, TransportError::Request(r) if r == "tls backend missing"));
        assert_eq!(transport.name(), "unavailable");
    }
}
