//! SMS notification delivery via an HTTP gateway.
//!
//! [`SmsDelivery`] POSTs a JSON payload to the configured gateway URL.
//! Each attempt has a bounded request timeout so a slow provider cannot
//! hold resources open; delivery is single-shot (the caller treats SMS as
//! best-effort and logs failures).

use std::time::Duration;

/// HTTP request timeout for a single delivery attempt.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for SMS delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum SmsError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("SMS gateway returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// SmsConfig
// ---------------------------------------------------------------------------

/// Configuration for the SMS gateway delivery service.
#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// Gateway endpoint that accepts `{"to", "body"}` JSON posts.
    pub gateway_url: String,
    /// Optional bearer token for the gateway.
    pub api_key: Option<String>,
}

impl SmsConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMS_GATEWAY_URL` is not set, signalling that SMS
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable          | Required | Default |
    /// |-------------------|----------|---------|
    /// | `SMS_GATEWAY_URL` | yes      | —       |
    /// | `SMS_API_KEY`     | no       | —       |
    pub fn from_env() -> Option<Self> {
        let gateway_url = std::env::var("SMS_GATEWAY_URL").ok()?;
        Some(Self {
            gateway_url,
            api_key: std::env::var("SMS_API_KEY").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// SmsDelivery
// ---------------------------------------------------------------------------

/// Sends notification texts through an HTTP SMS gateway.
pub struct SmsDelivery {
    config: SmsConfig,
    client: reqwest::Client,
}

impl SmsDelivery {
    /// Create a new delivery service with a pre-configured HTTP client.
    pub fn new(config: SmsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build reqwest HTTP client");
        Self { config, client }
    }

    /// Send a text to the given phone number.
    pub async fn deliver(&self, to_phone: &str, body: &str) -> Result<(), SmsError> {
        let payload = serde_json::json!({
            "to": to_phone,
            "body": body,
        });

        let mut request = self.client.post(&self.config.gateway_url).json(&payload);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SmsError::HttpStatus(response.status().as_u16()));
        }

        tracing::info!(to = to_phone, "Notification SMS sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SmsConfig {
        SmsConfig {
            gateway_url: "http://localhost:9/send".to_string(),
            api_key: None,
        }
    }

    #[test]
    fn new_does_not_panic() {
        let _delivery = SmsDelivery::new(config());
    }

    #[test]
    fn from_env_returns_none_without_gateway_url() {
        std::env::remove_var("SMS_GATEWAY_URL");
        assert!(SmsConfig::from_env().is_none());
    }

    #[test]
    fn sms_error_display_http_status() {
        let err = SmsError::HttpStatus(502);
        assert_eq!(err.to_string(), "SMS gateway returned HTTP 502");
    }
}
