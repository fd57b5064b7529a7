//! HTTP transport. One POST per call, no retries.
//!
//! The dispatcher owns retries and error classification; a [`Transport`] only
//! reports what happened on the wire.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tracing::{debug, error};

use elite_core::utils::truncate_string;

/// A POST that did not produce a 2xx response.
#[derive(Clone, Debug, PartialEq)]
pub struct TransportFailure {
    /// HTTP status, absent for network-level failures.
    pub status: Option<u16>,
    /// Raw response body, if one was read.
    pub body: Option<String>,
    pub message: String,
}

impl TransportFailure {
    /// A failure with an HTTP status and body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            body: Some(body.into()),
            message: format!("HTTP {}", status),
        }
    }

    /// A failure before any HTTP status was received.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            body: None,
            message: message.into(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
    }
}

/// Performs one HTTP POST with a JSON body and returns the raw success body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &HeaderMap,
    ) -> Result<String, TransportFailure>;
}

// ─────────────────────────────────────────────
// HttpTransport
// ─────────────────────────────────────────────

/// `reqwest`-backed transport (shared, connection-pooled client).
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: &serde_json::Value,
        headers: &HeaderMap,
    ) -> Result<String, TransportFailure> {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "HTTP request failed");
                TransportFailure::network(e.to_string())
            })?;

        let status = response.status();
        let text = response.text().await;

        if !status.is_success() {
            let error_text = text.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(
                status = %status,
                body = %truncate_string(&error_text, 500),
                "API error"
            );
            return Err(TransportFailure::http(status.as_u16(), error_text));
        }

        text.map_err(|e| {
            error!(error = %e, "Failed to read response body");
            TransportFailure::network(format!("Failed to read response body: {}", e))
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
