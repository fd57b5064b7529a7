//! Display helpers for error text shown to users.

const PROVIDER_PREFIX: &str = "Failed to get response from ";
const GENERIC_PREFIX: &str = "Failed to get AI response:";

/// Strip boilerplate from an error message for display.
///
/// Removes a `"Failed to get response from <provider>:"` or
/// `"Failed to get AI response:"` prefix and trims what is left. Messages
/// without either prefix are returned unchanged.
pub fn format_error_message(message: &str) -> String {
    if let Some(pos) = message.find(PROVIDER_PREFIX) {
        let rest = &message[pos + PROVIDER_PREFIX.len()..];
        if let Some(colon) = rest.find(':') {
            return rest[colon + 1..].trim().to_string();
        }
    }

    if let Some(pos) = message.find(GENERIC_PREFIX) {
        return message[pos + GENERIC_PREFIX.len()..].trim().to_string();
    }

    message.to_string()
}
