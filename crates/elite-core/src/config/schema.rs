//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProvidersConfig`, `RequestDefaults`, `TransportConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration — loaded from `~/.elite/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub environment: Environment,
    pub providers: ProvidersConfig,
    pub request: RequestDefaults,
    pub transport: TransportConfig,
}

/// Deployment environment. Production switches logs to JSON.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Parse `"dev"`, `"development"`, `"prod"` or `"production"`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "dev" | "development" => Some(Environment::Development),
            "prod" | "production" => Some(Environment::Production),
            _ => None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// ─────────────────────────────────────────────
// Providers
// ─────────────────────────────────────────────

/// Settings for a single chat completion provider.
///
/// Defaults target the OpenAI chat completions endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderSettings {
    /// Full chat completions URL.
    pub api_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Inline API key. Takes precedence over `api_key_path`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// File holding the API key (`~` is expanded).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_path: Option<String>,
    /// Retries on HTTP 429. Unset uses the registry default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Base backoff delay in milliseconds. Unset uses the registry default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
            api_key_path: Some("~/.elite/openai.key".to_string()),
            max_retries: Some(3),
            retry_delay_ms: Some(2000),
        }
    }
}

impl ProviderSettings {
    /// Whether a key source (inline or file) is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() || self.api_key_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// All provider settings, one field per supported provider.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderSettings,
}

impl ProvidersConfig {
    /// Get provider settings by name (e.g. `"openai"`).
    pub fn get_by_name(&self, name: &str) -> Option<&ProviderSettings> {
        match name {
            "openai" => Some(&self.openai),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────
// Request defaults
// ─────────────────────────────────────────────

/// Generation parameters applied to questions asked from the CLI.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestDefaults {
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate per answer.
    pub max_tokens: u32,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// ─────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────

/// HTTP transport settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransportConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
