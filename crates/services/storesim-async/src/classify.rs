//! Status / body / bracket-code classification.
//!
//! One rule set turns an HTTP failure or any other error text into a
//! machine-readable code plus a display message:
//!
//! 1. status `>= 500` always yields `SERVER_5XX`
//! 2. the message comes from `detail`, `error_message` or `message`, else a
//!    status default
//! 3. a leading `[UPPER_CASE]` token supplies the code when none is known yet
//! 4. the code is looked up in the catalog, falling back to the message

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::StandardError;
use crate::messages::{self, Locale, codes};

/// Body fields that may carry a server message, highest priority first
pub const MESSAGE_FIELDS: &[&str] = &["detail", "error_message", "message"];

#[expect(clippy::expect_used, reason = "the pattern is a literal")]
static BRACKET_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[([A-Z_]+)\]").expect("bracket-code pattern compiles"));

/// Extracts `CODE` from a message starting with `[CODE]`.
#[must_use]
pub fn bracket_code(message: &str) -> Option<&str> {
    BRACKET_CODE
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// First string-valued message field of an error body.
#[must_use]
pub fn server_message(body: &Value) -> Option<&str> {
    MESSAGE_FIELDS
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
}

/// Code forced by the status alone.
#[must_use]
pub const fn status_code(status: u16) -> Option<&'static str> {
    if status >= 500 {
        Some(codes::SERVER_5XX)
    } else {
        None
    }
}

/// Builds the [`StandardError`] for a non-success HTTP response.
///
/// `body` is whatever JSON could be parsed from the response, if any.
#[must_use]
pub fn standard_error(status: u16, body: Option<Value>, locale: Locale) -> StandardError {
    let raw_message = body
        .as_ref()
        .and_then(server_message)
        .map(ToString::to_string);
    let resolved = raw_message
        .clone()
        .unwrap_or_else(|| messages::status_default(status, locale));

    let code = status_code(status)
        .map(ToString::to_string)
        .or_else(|| bracket_code(&resolved).map(ToString::to_string));

    let message = messages::message_or(code.as_deref(), Some(&resolved), locale);

    StandardError {
        status: Some(status),
        code,
        message,
        raw_message,
        raw: body.unwrap_or(Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bracket_code_requires_leading_token() {
        assert_eq!(bracket_code("[DB_DOWN] connection refused"), Some("DB_DOWN"));
        assert_eq!(bracket_code("[X]"), Some("X"));
        assert_eq!(bracket_code(" [DB_DOWN] leading space"), None);
        assert_eq!(bracket_code("[lower] nope"), None);
        assert_eq!(bracket_code("[DB-DOWN] dash"), None);
        assert_eq!(bracket_code("[] empty"), None);
        assert_eq!(bracket_code("no code here"), None);
    }

    #[test]
    fn server_message_priority() {
        let body = json!({"message": "m", "error_message": "e", "detail": "d"});
        assert_eq!(server_message(&body), Some("d"));

        let body = json!({"message": "m", "error_message": "e"});
        assert_eq!(server_message(&body), Some("e"));

        let body = json!({"detail": {"loc": ["x"]}, "message": "m"});
        assert_eq!(server_message(&body), Some("m"));

        assert_eq!(server_message(&json!([1, 2])), None);
    }

    #[test]
    fn server_error_code_beats_bracket_code() {
        let err = standard_error(
            503,
            Some(json!({"detail": "[DB_DOWN] connection refused"})),
            Locale::En,
        );
        assert_eq!(err.status, Some(503));
        assert_eq!(err.code.as_deref(), Some(codes::SERVER_5XX));
        assert_eq!(
            err.message,
            messages::lookup(codes::SERVER_5XX, Locale::En).unwrap_or_default()
        );
        assert_eq!(err.raw_message.as_deref(), Some("[DB_DOWN] connection refused"));
    }

    #[test]
    fn bracket_code_used_below_500() {
        let err = standard_error(
            409,
            Some(json!({"error_message": "[STRATEGY_PARSE_COUNT_MISMATCH] 3 != 5"})),
            Locale::En,
        );
        assert_eq!(err.code.as_deref(), Some(codes::STRATEGY_PARSE_COUNT_MISMATCH));
        assert_eq!(
            err.message,
            messages::lookup(codes::STRATEGY_PARSE_COUNT_MISMATCH, Locale::En).unwrap_or_default()
        );
    }

    #[test]
    fn unknown_bracket_code_keeps_server_text() {
        let err = standard_error(400, Some(json!({"message": "[WEIRD] bad input"})), Locale::En);
        assert_eq!(err.code.as_deref(), Some("WEIRD"));
        assert_eq!(err.message, "[WEIRD] bad input");
    }

    #[test]
    fn status_defaults_without_body() {
        let err = standard_error(404, None, Locale::En);
        assert_eq!(err.code, None);
        assert_eq!(err.message, "The requested resource was not found.");
        assert_eq!(err.raw, Value::Null);

        let err = standard_error(401, Some(json!({})), Locale::Ko);
        assert_eq!(err.message, "인증이 필요합니다.");

        let err = standard_error(422, None, Locale::En);
        assert_eq!(err.message, "An error occurred. (422)");
    }

    #[test]
    fn server_error_without_body_uses_catalog() {
        let err = standard_error(500, None, Locale::Ko);
        assert_eq!(err.code.as_deref(), Some(codes::SERVER_5XX));
        assert!(!err.message.is_empty());
    }
}
