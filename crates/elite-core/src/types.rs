//! Core types for ELiTE — the question a user asks, the answer we hand back,
//! and the OpenAI chat completions wire format in between.

use serde::{Deserialize, Serialize};

/// Sampling temperature used when a request leaves it unset.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Completion token cap used when a request leaves it unset.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

// ─────────────────────────────────────────────
// Ask request / normalized response
// ─────────────────────────────────────────────

/// Optional generation parameters attached to a question.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// One exam question submitted by a user.
///
/// Built once per submission and only ever read afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub options: RequestOptions,
}

impl AskRequest {
    /// Create a request with default generation options.
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: RequestOptions::default(),
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.options.max_tokens = Some(max_tokens);
        self
    }

    /// Effective temperature (falls back to [`DEFAULT_TEMPERATURE`]).
    pub fn temperature(&self) -> f64 {
        self.options.temperature.unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Effective token cap (falls back to [`DEFAULT_MAX_TOKENS`]).
    pub fn max_tokens(&self) -> u32 {
        self.options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Whether the question has any non-whitespace content.
    pub fn has_question(&self) -> bool {
        !self.question.trim().is_empty()
    }
}

/// A provider answer mapped into a provider-independent shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NormalizedResponse {
    /// The answer text, exactly as the provider returned it.
    pub content: String,
    /// Registry name of the provider that produced the answer.
    pub source_provider_name: String,
    /// The full decoded response body.
    pub raw_payload: serde_json::Value,
}

// ─────────────────────────────────────────────
// Messages (OpenAI chat completions format)
// ─────────────────────────────────────────────

/// A chat message in the OpenAI format.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

// ─────────────────────────────────────────────
// Chat completion request / response
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Raw chat completion response. Only `choices` is decoded: every choice
/// must carry string content, otherwise deserialization fails. Everything
/// else in the body is ignored here.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: String,
}

/// Token usage statistics. Missing counters read as zero.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
