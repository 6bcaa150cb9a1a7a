//! External Notification Client
//!
//! Delivers sign-up confirmations to the downstream API with a single POST.
//! Failures are returned to the caller; nothing here retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{LifecycleEvent, TriggerError};

/// Body sent for a confirmed sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPayload {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ConfirmationPayload {
    pub fn from_event(event: &LifecycleEvent) -> Self {
        Self {
            user_id: event.user_name.clone(),
            email: event.email().map(str::to_string),
        }
    }
}

#[async_trait]
pub trait ConfirmationNotifier: Send + Sync {
    /// Deliver one confirmation. A non-2xx answer is an error.
    async fn notify(&self, payload: &ConfirmationPayload) -> Result<(), TriggerError>;

    /// Check if delivery is configured
    fn is_enabled(&self) -> bool {
        true
    }
}

/// HTTP notifier configuration
#[derive(Debug, Clone)]
pub struct HttpNotifierConfig {
    /// Full confirmation endpoint URL
    pub endpoint_url: String,
    /// Pre-shared header sent with every request
    pub header: Option<(String, String)>,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl HttpNotifierConfig {
    pub fn new(endpoint_url: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            header: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.header = Some((key.into(), value.into()));
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Notifier that POSTs JSON to the configured endpoint
pub struct HttpConfirmationNotifier {
    config: HttpNotifierConfig,
    client: reqwest::Client,
}

impl HttpConfirmationNotifier {
    pub fn new(config: HttpNotifierConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some((key, value)) = &config.header {
            let name = HeaderName::from_bytes(key.as_bytes())?;
            let mut value = HeaderValue::from_str(value)?;
            value.set_sensitive(true);
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .default_headers(headers)
            .user_agent(concat!("idhook/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!(
            endpoint = %config.endpoint_url,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "HttpConfirmationNotifier initialized"
        );

        Ok(Self { config, client })
    }
}

#[async_trait]
impl ConfirmationNotifier for HttpConfirmationNotifier {
    async fn notify(&self, payload: &ConfirmationPayload) -> Result<(), TriggerError> {
        debug!(user_id = %payload.user_id, url = %self.config.endpoint_url, "Sending confirmation callback");

        let response = self.client
            .post(&self.config.endpoint_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("request timed out after {:?}", self.config.request_timeout)
                } else {
                    e.to_string()
                };
                warn!(user_id = %payload.user_id, error = %reason, "Confirmation callback failed");
                TriggerError::NotificationDeliveryFailed(reason)
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!(user_id = %payload.user_id, error = %e, "Could not read confirmation callback response body");
                String::new()
            }
        };

        if status.is_success() {
            info!(user_id = %payload.user_id, status = status.as_u16(), "Confirmation callback delivered");
            debug!(body = %body, "Confirmation callback response");
            Ok(())
        } else {
            warn!(user_id = %payload.user_id, status = status.as_u16(), "Confirmation callback rejected");
            Err(TriggerError::NotificationDeliveryFailed(format!("HTTP {}: {}", status, body)))
        }
    }
}

/// Stand-in used when no endpoint is configured.
///
/// Confirmations still fail loudly instead of being dropped.
pub struct DisabledNotifier;

#[async_trait]
impl ConfirmationNotifier for DisabledNotifier {
    async fn notify(&self, _payload: &ConfirmationPayload) -> Result<(), TriggerError> {
        Err(TriggerError::NotificationDeliveryFailed(
            "notification endpoint not configured".to_string(),
        ))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_serialization() {
        let payload = ConfirmationPayload {
            user_id: "alice".to_string(),
            email: Some("alice@example.com".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"userId": "alice", "email": "alice@example.com"})
        );

        let no_email = ConfirmationPayload { user_id: "bob".to_string(), email: None };
        assert_eq!(serde_json::to_value(&no_email).unwrap(), json!({"userId": "bob"}));
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let config = HttpNotifierConfig::new("http://localhost:1/confirm").with_header("bad header", "v");
        assert!(HttpConfirmationNotifier::new(config).is_err());
    }

    #[tokio::test]
    async fn test_disabled_notifier_fails() {
        let notifier = DisabledNotifier;
        assert!(!notifier.is_enabled());
        let payload = ConfirmationPayload { user_id: "carol".to_string(), email: None };
        assert!(matches!(
            notifier.notify(&payload).await,
            Err(TriggerError::NotificationDeliveryFailed(_))
        ));
    }
}
