//! OpenAI chat completions wire format.

use elite_core::types::{
    AskRequest, ChatCompletionRequest, ChatCompletionResponse, Message, UsageInfo,
};
use serde::Deserialize;
use tracing::debug;

use crate::registry::ProviderConfig;

/// Build `{model, messages: [{role: "user", content}], temperature, max_tokens}`.
pub fn format_request(
    request: &AskRequest,
    config: &ProviderConfig,
) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(ChatCompletionRequest {
        model: config.model.clone(),
        messages: vec![Message::user(request.question.clone())],
        temperature: request.temperature(),
        max_tokens: request.max_tokens(),
    })
}

/// Return `choices[0].message.content` verbatim.
///
/// Fails if `choices` is missing or empty, or if any choice lacks a string
/// `message.content`. Nothing outside `choices` can fail the parse.
pub fn parse_response(body: &serde_json::Value) -> Result<String, String> {
    let response = ChatCompletionResponse::deserialize(body).map_err(|e| e.to_string())?;

    log_usage(body);

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| "response contains no choices".to_string())
}

/// Debug-log token usage when the body carries a readable `usage` object.
fn log_usage(body: &serde_json::Value) {
    let Some(usage) = body
        .get("usage")
        .and_then(|u| UsageInfo::deserialize(u).ok())
    else {
        return;
    };

    debug!(
        id = body.get("id").and_then(|id| id.as_str()).unwrap_or("?"),
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "Chat completion usage"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::find_by_name;
    use serde_json::json;

    fn config() -> ProviderConfig {
        ProviderConfig::new(find_by_name("openai").unwrap(), "sk-test").with_model("gpt-4o")
    }

    #[test]
    fn test_format_request_defaults() {
        let body = format_request(&AskRequest::new("What is 2+2?"), &config()).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [{ "role": "user", "content": "What is 2+2?" }],
                "temperature": 0.7,
                "max_tokens": 1000
            })
        );
    }

    #[test]
    fn test_format_request_options() {
        let request = AskRequest::new("q").with_temperature(0.1).with_max_tokens(42);
        let body = format_request(&request, &config()).unwrap();
        assert_eq!(body["temperature"], 0.1);
        assert_eq!(body["max_tokens"], 42);
    }

    #[test]
    fn test_parse_response_exact_content() {
        let content = "  Four.\n\nBecause 2 + 2 = 4  ";
        let body = json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] });
        assert_eq!(parse_response(&body).unwrap(), content);
    }

    #[test]
    fn test_parse_response_uses_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "content": "first" } },
                { "message": { "content": "second" } }
            ]
        });
        assert_eq!(parse_response(&body).unwrap(), "first");
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let err = parse_response(&json!({ "id": "chatcmpl-1" })).unwrap_err();
        assert!(err.contains("choices"));
    }

    #[test]
    fn test_parse_response_empty_choices() {
        let err = parse_response(&json!({ "choices": [] })).unwrap_err();
        assert_eq!(err, "response contains no choices");
    }

    #[test]
    fn test_parse_response_content_not_string() {
        assert!(parse_response(&json!({ "choices": [{ "message": { "content": 4 } }] })).is_err());
        assert!(parse_response(&json!({ "choices": [{ "message": {} }] })).is_err());
        assert!(parse_response(&json!({ "choices": [{}] })).is_err());
    }

    #[test]
    fn test_parse_response_tolerates_odd_optional_fields() {
        let partial_usage = json!({
            "choices": [{ "message": { "content": "4" } }],
            "usage": { "prompt_tokens": 3 }
        });
        assert_eq!(parse_response(&partial_usage).unwrap(), "4");

        let numeric_id = json!({
            "id": 12345,
            "choices": [{ "message": { "content": "4" } }],
            "usage": [1, 2, 3]
        });
        assert_eq!(parse_response(&numeric_id).unwrap(), "4");
    }

    #[test]
    fn test_parse_response_not_an_object() {
        assert!(parse_response(&json!("plain text")).is_err());
    }
}
