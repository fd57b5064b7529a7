//! Request dispatch: validation, the HTTP call, and 429 retries.
//!
//! For each submission the dispatcher resolves the provider, validates the
//! question, formats the payload once, then POSTs it through the
//! [`Transport`]. HTTP 429 is retried with exponential backoff
//! (`base × 2^(attempt-1)`); every other failure is classified and returned.
//! Attempts for one call are strictly sequential, and the backoff wait is a
//! timer that a [`CancellationToken`] can interrupt. Callers that want to show
//! retry progress get a [`RetryNotice`] before each wait.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use elite_core::types::{AskRequest, NormalizedResponse};
use elite_core::utils::truncate_string;

use crate::error::DispatchError;
use crate::registry::{ProviderConfig, ProviderRegistry};
use crate::transport::{Transport, TransportFailure};

/// Per-call retry bookkeeping. Never shared between calls.
#[derive(Debug)]
struct RetryState<'a> {
    provider: &'a str,
    /// Retries performed so far (0 on the first attempt).
    attempt_count: u32,
}

impl<'a> RetryState<'a> {
    fn new(provider: &'a str) -> Self {
        Self {
            provider,
            attempt_count: 0,
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempt_count + 1
    }
}

/// Delay before retry number `attempt` (1-based): `base × 2^(attempt-1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent)
}

/// Emitted before each rate-limit backoff wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryNotice {
    /// Retry about to be made (1-based).
    pub attempt: u32,
    pub max_retries: u32,
    /// How long the dispatcher waits before that retry.
    pub delay: Duration,
}

/// Sends questions to registered providers.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ProviderRegistry>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("providers", &self.registry.names())
            .finish()
    }
}

impl Dispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, transport: Arc<dyn Transport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Send `request` to the provider registered as `provider_name`.
    pub async fn send(
        &self,
        provider_name: &str,
        request: &AskRequest,
    ) -> Result<NormalizedResponse, DispatchError> {
        self.send_with_cancel(provider_name, request, &CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send), but gives up with [`DispatchError::Cancelled`]
    /// as soon as `cancel` fires, including mid-request and mid-backoff.
    pub async fn send_with_cancel(
        &self,
        provider_name: &str,
        request: &AskRequest,
        cancel: &CancellationToken,
    ) -> Result<NormalizedResponse, DispatchError> {
        self.dispatch(provider_name, request, cancel, None).await
    }

    /// Like [`send_with_cancel`](Self::send_with_cancel), and also reports
    /// every rate-limit backoff on `progress`. The sender is dropped when
    /// the call finishes, which closes the channel.
    pub async fn send_with_progress(
        &self,
        provider_name: &str,
        request: &AskRequest,
        cancel: &CancellationToken,
        progress: UnboundedSender<RetryNotice>,
    ) -> Result<NormalizedResponse, DispatchError> {
        self.dispatch(provider_name, request, cancel, Some(&progress))
            .await
    }

    async fn dispatch(
        &self,
        provider_name: &str,
        request: &AskRequest,
        cancel: &CancellationToken,
        progress: Option<&UnboundedSender<RetryNotice>>,
    ) -> Result<NormalizedResponse, DispatchError> {
        let config = self.registry.lookup(provider_name).ok_or_else(|| {
            DispatchError::UnregisteredProvider {
                provider: provider_name.to_string(),
            }
        })?;

        if !request.has_question() {
            return Err(DispatchError::InvalidRequest {
                reason: "Please enter an exam question first".to_string(),
            });
        }

        let payload = (config.spec.format_request)(request, config.as_ref()).map_err(|e| {
            DispatchError::InvalidRequest {
                reason: format!("could not encode request: {}", e),
            }
        })?;
        let headers = request_headers(&config)?;
        let max_retries = config.max_retries();
        let mut state = RetryState::new(provider_name);

        debug!(
            provider = provider_name,
            model = %config.model,
            question_len = request.question.len(),
            "Sending question"
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(&state)),
                outcome = self.transport.post(&config.endpoint_url, &payload, &headers) => outcome,
            };

            let failure = match outcome {
                Ok(body) => {
                    if state.attempt_count > 0 {
                        info!(
                            provider = state.provider,
                            attempts = state.total_attempts(),
                            "Request succeeded after retry"
                        );
                    }
                    return normalize(&config, state.provider, &body);
                }
                Err(failure) => failure,
            };

            if !failure.is_rate_limited() {
                return Err(classify_failure(state.provider, failure));
            }

            if state.attempt_count >= max_retries {
                warn!(
                    provider = state.provider,
                    attempts = state.total_attempts(),
                    "Rate limit retries exhausted"
                );
                return Err(DispatchError::RateLimited {
                    provider: state.provider.to_string(),
                    attempts: state.total_attempts(),
                });
            }

            state.attempt_count += 1;
            let delay = backoff_delay(config.base_retry_delay(), state.attempt_count);
            warn!(
                provider = state.provider,
                attempt = state.attempt_count,
                max_retries,
                delay_ms = delay.as_millis() as u64,
                "Rate limit exceeded, retrying"
            );
            if let Some(progress) = progress {
                // A closed receiver only means nobody is watching.
                let _ = progress.send(RetryNotice {
                    attempt: state.attempt_count,
                    max_retries,
                    delay,
                });
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(cancelled(&state)),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}

fn cancelled(state: &RetryState<'_>) -> DispatchError {
    debug!(
        provider = state.provider,
        retries = state.attempt_count,
        "Request cancelled"
    );
    DispatchError::Cancelled {
        provider: state.provider.to_string(),
    }
}

/// `Authorization: Bearer <key>` and `Content-Type: application/json`.
fn request_headers(config: &ProviderConfig) -> Result<HeaderMap, DispatchError> {
    let mut auth = HeaderValue::from_str(&config.auth_header_value).map_err(|_| {
        DispatchError::InvalidRequest {
            reason: format!(
                "API key for {} contains characters not allowed in an HTTP header",
                config.name
            ),
        }
    })?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Decode a success body and pull the answer out of it.
fn normalize(
    config: &ProviderConfig,
    provider: &str,
    body: &str,
) -> Result<NormalizedResponse, DispatchError> {
    let raw_payload: serde_json::Value =
        serde_json::from_str(body).map_err(|e| DispatchError::MalformedResponse {
            provider: provider.to_string(),
            detail: format!("response body is not JSON: {}", e),
        })?;

    let content = (config.spec.parse_response)(&raw_payload).map_err(|detail| {
        warn!(provider, detail = %detail, "Malformed provider response");
        DispatchError::MalformedResponse {
            provider: provider.to_string(),
            detail,
        }
    })?;

    debug!(provider, content_len = content.len(), "Response received");

    Ok(NormalizedResponse {
        content,
        source_provider_name: provider.to_string(),
        raw_payload,
    })
}

/// Map a non-429 transport failure to a [`DispatchError`].
pub fn classify_failure(provider: &str, failure: TransportFailure) -> DispatchError {
    let provider_name = provider.to_string();
    match failure.status {
        None => DispatchError::TransportError {
            provider: provider_name,
            message: failure.message,
        },
        Some(401) => DispatchError::AuthError {
            provider: provider_name,
        },
        Some(400) => DispatchError::BadRequest {
            provider: provider_name,
            detail: upstream_detail(&failure),
        },
        Some(status @ (500 | 502 | 503 | 504)) => DispatchError::UpstreamUnavailable {
            provider: provider_name,
            status,
        },
        Some(status) => DispatchError::UnknownProviderError {
            provider: provider_name,
            status,
            detail: upstream_detail(&failure),
        },
    }
}

/// Best human-readable detail from an error body: `error.message` if the body
/// is an OpenAI-style error, else the (truncated) raw body, else the message.
fn upstream_detail(failure: &TransportFailure) -> String {
    let Some(body) = failure.body.as_deref().filter(|b| !b.trim().is_empty()) else {
        return failure.message.clone();
    };

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| truncate_string(body.trim(), 200))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
