//! Error types for provider dispatch and startup.

use thiserror::Error;

/// Classification of a failed dispatch, independent of the message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnregisteredProvider,
    InvalidRequest,
    MalformedResponse,
    RateLimited,
    AuthError,
    BadRequest,
    UpstreamUnavailable,
    UnknownProviderError,
    TransportError,
    Cancelled,
}

/// A failed call to [`Dispatcher::send`](crate::Dispatcher::send).
///
/// Failures that come back from a provider render with a
/// `"Failed to get response from <provider>: "` prefix, which
/// [`format_error_message`](crate::format_error_message) strips for display.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DispatchError {
    #[error("AI service '{provider}' not registered")]
    UnregisteredProvider { provider: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Failed to get response from {provider}: Malformed response: {detail}")]
    MalformedResponse { provider: String, detail: String },

    #[error(
        "Failed to get response from {provider}: Rate limit exceeded after {attempts} attempts. Please try again later."
    )]
    RateLimited { provider: String, attempts: u32 },

    #[error(
        "Failed to get response from {provider}: Authentication failed (HTTP 401). Check your API key."
    )]
    AuthError { provider: String },

    #[error("Failed to get response from {provider}: Bad request: {detail}")]
    BadRequest { provider: String, detail: String },

    #[error(
        "Failed to get response from {provider}: Service unavailable (HTTP {status}). Please try again later."
    )]
    UpstreamUnavailable { provider: String, status: u16 },

    #[error("Failed to get response from {provider}: Unexpected error (HTTP {status}): {detail}")]
    UnknownProviderError {
        provider: String,
        status: u16,
        detail: String,
    },

    #[error("Failed to get response from {provider}: {message}")]
    TransportError { provider: String, message: String },

    #[error("Request to {provider} was cancelled")]
    Cancelled { provider: String },
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnregisteredProvider { .. } => ErrorKind::UnregisteredProvider,
            DispatchError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            DispatchError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            DispatchError::RateLimited { .. } => ErrorKind::RateLimited,
            DispatchError::AuthError { .. } => ErrorKind::AuthError,
            DispatchError::BadRequest { .. } => ErrorKind::BadRequest,
            DispatchError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            DispatchError::UnknownProviderError { .. } => ErrorKind::UnknownProviderError,
            DispatchError::TransportError { .. } => ErrorKind::TransportError,
            DispatchError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Name of the provider involved, if the request got that far.
    pub fn provider(&self) -> Option<&str> {
        match self {
            DispatchError::InvalidRequest { .. } => None,
            DispatchError::UnregisteredProvider { provider }
            | DispatchError::MalformedResponse { provider, .. }
            | DispatchError::RateLimited { provider, .. }
            | DispatchError::AuthError { provider }
            | DispatchError::BadRequest { provider, .. }
            | DispatchError::UpstreamUnavailable { provider, .. }
            | DispatchError::UnknownProviderError { provider, .. }
            | DispatchError::TransportError { provider, .. }
            | DispatchError::Cancelled { provider } => Some(provider),
        }
    }

    /// Whether resubmitting the same question later may succeed.
    ///
    /// The dispatcher itself only retries 429s; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::UpstreamUnavailable | ErrorKind::TransportError
        )
    }
}

/// Fatal startup failures. There is no degraded mode: the caller aborts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum InitError {
    #[error("{provider} API key is empty or not found")]
    MissingApiKey { provider: String },

    #[error("Invalid {provider} API key format")]
    InvalidApiKey { provider: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_carry_prefix() {
        let err = DispatchError::AuthError {
            provider: "openai".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to get response from openai:"));
        assert!(msg.contains("Authentication"));
    }

    #[test]
    fn test_kind_and_provider() {
        let err = DispatchError::RateLimited {
            provider: "openai".into(),
            attempts: 4,
        };
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.provider(), Some("openai"));
        assert!(err.to_string().contains("Rate limit exceeded"));

        let err = DispatchError::InvalidRequest {
            reason: "empty".into(),
        };
        assert_eq!(err.provider(), None);
    }

    #[test]
    fn test_is_transient() {
        assert!(DispatchError::UpstreamUnavailable {
            provider: "openai".into(),
            status: 503
        }
        .is_transient());
        assert!(!DispatchError::AuthError {
            provider: "openai".into()
        }
        .is_transient());
        assert!(!DispatchError::MalformedResponse {
            provider: "openai".into(),
            detail: "x".into()
        }
        .is_transient());
    }

    #[test]
    fn test_init_error_messages() {
        let err = InitError::MissingApiKey {
            provider: "OpenAI".into(),
        };
        assert_eq!(err.to_string(), "OpenAI API key is empty or not found");
    }
}
