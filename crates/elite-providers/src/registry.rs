//! Provider registry — static wire-format specs plus the runtime table of
//! registered provider configurations.
//!
//! A [`ProviderSpec`] says how to talk to a kind of provider (request
//! formatting, response parsing, key shape). A [`ProviderConfig`] is one
//! concrete, authenticated endpoint built from a spec at startup and stored
//! in the [`ProviderRegistry`] under a name.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use elite_core::types::AskRequest;
use tracing::{debug, warn};

use crate::openai;

/// Retries on HTTP 429 when a config leaves it unset.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Base backoff delay when a config leaves it unset.
pub const DEFAULT_BASE_RETRY_DELAY_MS: u64 = 1000;

/// Base backoff delay actually used for a configured value. Unset and zero
/// both fall back to [`DEFAULT_BASE_RETRY_DELAY_MS`].
pub fn effective_retry_delay_ms(configured: Option<u64>) -> u64 {
    configured
        .filter(|&ms| ms > 0)
        .unwrap_or(DEFAULT_BASE_RETRY_DELAY_MS)
}

/// Builds the provider-specific request body.
pub type FormatRequestFn = fn(&AskRequest, &ProviderConfig) -> serde_json::Result<serde_json::Value>;

/// Extracts the answer text from a decoded success body, or describes why it can't.
pub type ParseResponseFn = fn(&serde_json::Value) -> Result<String, String>;

// ─────────────────────────────────────────────
// ProviderSpec — static metadata for one provider kind
// ─────────────────────────────────────────────

/// Static specification describing one provider kind.
#[derive(Clone)]
pub struct ProviderSpec {
    /// Internal name (e.g. `"openai"`).
    pub name: &'static str,
    /// Human-readable name for logs and errors. E.g. `"OpenAI"`.
    pub display_name: &'static str,
    /// Endpoint used when the configuration does not set one.
    pub default_api_url: &'static str,
    /// Model used when the configuration does not set one.
    pub default_model: &'static str,
    /// Required API key prefix, if the provider has a recognizable key shape.
    pub key_prefix: Option<&'static str>,
    /// Shortest plausible API key.
    pub min_key_len: usize,
    pub format_request: FormatRequestFn,
    pub parse_response: ParseResponseFn,
}

impl std::fmt::Debug for ProviderSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSpec")
            .field("name", &self.name)
            .field("default_api_url", &self.default_api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl ProviderSpec {
    /// Basic sanity check of an API key's shape.
    pub fn is_valid_key(&self, key: &str) -> bool {
        let prefix_ok = self.key_prefix.map_or(true, |pfx| key.starts_with(pfx));
        prefix_ok && key.len() >= self.min_key_len
    }
}

/// All supported provider kinds. Adding a provider means adding an entry here.
pub static PROVIDERS: &[ProviderSpec] = &[ProviderSpec {
    name: "openai",
    display_name: "OpenAI",
    default_api_url: "https://api.openai.com/v1/chat/completions",
    default_model: "gpt-3.5-turbo",
    key_prefix: Some("sk-"),
    min_key_len: 20,
    format_request: openai::format_request,
    parse_response: openai::parse_response,
}];

/// Find a provider spec by exact name.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|spec| spec.name == name)
}

// ─────────────────────────────────────────────
// ProviderConfig — one registered endpoint
// ─────────────────────────────────────────────

/// Configuration for one registered provider. Immutable once registered.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Registry key. Overwritten by [`ProviderRegistry::register`].
    pub name: String,
    pub endpoint_url: String,
    pub model: String,
    /// Full `Authorization` header value (`"Bearer <key>"`).
    pub auth_header_value: String,
    pub max_retries: Option<u32>,
    pub base_retry_delay_ms: Option<u64>,
    pub spec: &'static ProviderSpec,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("endpoint_url", &self.endpoint_url)
            .field("model", &self.model)
            .field("auth_header_value", &"<redacted>")
            .field("max_retries", &self.max_retries)
            .field("base_retry_delay_ms", &self.base_retry_delay_ms)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a config for `spec` using its default endpoint and model.
    pub fn new(spec: &'static ProviderSpec, api_key: &str) -> Self {
        Self {
            name: spec.name.to_string(),
            endpoint_url: spec.default_api_url.to_string(),
            model: spec.default_model.to_string(),
            auth_header_value: format!("Bearer {}", api_key),
            max_retries: None,
            base_retry_delay_ms: None,
            spec,
        }
    }

    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    pub fn with_base_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.base_retry_delay_ms = Some(delay_ms);
        self
    }

    /// Effective retry budget for HTTP 429.
    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Effective base backoff delay.
    pub fn base_retry_delay(&self) -> Duration {
        Duration::from_millis(effective_retry_delay_ms(self.base_retry_delay_ms))
    }
}

// ─────────────────────────────────────────────
// ProviderRegistry
// ─────────────────────────────────────────────

/// Name → config table. Filled once at startup, then shared read-only.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: HashMap<String, Arc<ProviderConfig>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `config` under `name`, filling unset retry fields with defaults.
    ///
    /// Replaces any earlier entry with the same name. A zero base delay is
    /// treated as unset.
    pub fn register(&mut self, name: impl Into<String>, mut config: ProviderConfig) -> Arc<ProviderConfig> {
        let name = name.into();
        config.name = name.clone();

        if config.base_retry_delay_ms == Some(0) {
            warn!(provider = %name, "Zero retry delay configured, using default");
        }
        config.max_retries.get_or_insert(DEFAULT_MAX_RETRIES);
        config.base_retry_delay_ms = Some(effective_retry_delay_ms(config.base_retry_delay_ms));

        debug!(
            provider = %name,
            endpoint = %config.endpoint_url,
            model = %config.model,
            max_retries = config.max_retries(),
            "Registered provider"
        );

        let config = Arc::new(config);
        if self.entries.insert(name.clone(), Arc::clone(&config)).is_some() {
            debug!(provider = %name, "Replaced existing provider registration");
        }
        config
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ProviderConfig>> {
        self.entries.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
