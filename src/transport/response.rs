//! Normalization of raw HTTP responses into `Result<T, TransportError>`.
//!
//! | Status / body                         | Outcome                   |
//! |---------------------------------------|---------------------------|
//! | 2xx, body decodes as `T`              | `Ok(T)`                   |
//! | 2xx, `{"success": false, ...}`        | `Server`                  |
//! | 2xx, body does not decode             | `Network`                 |
//! | 401 / 403                             | `Unauthorized`            |
//! | other 4xx                             | `Validation`              |
//! | 5xx, anything else                    | `Server`                  |

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{TransportError, TransportErrorKind};

/// Classify a non-success status code.
pub fn kind_for_status(status: u16) -> TransportErrorKind {
    match status {
        401 | 403 => TransportErrorKind::Unauthorized,
        400..=499 => TransportErrorKind::Validation,
        _ => TransportErrorKind::Server,
    }
}

/// Pull the server-provided failure message out of an error body.
///
/// Recognizes `detail` (string, or a list of `{msg}` objects), `error` and
/// `message`.
pub fn extract_message(body: &Value) -> Option<String> {
    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
        Some(Value::Array(items)) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !msgs.is_empty() {
                return Some(msgs.join("; "));
            }
        }
        _ => {}
    }
    ["error", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_body(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Some(Value::Null);
    }
    serde_json::from_slice(bytes).ok()
}

/// Interpret a completed HTTP exchange.
pub fn interpret<T: DeserializeOwned>(status: u16, bytes: &[u8]) -> Result<T, TransportError> {
    let body = parse_body(bytes);

    if !(200..300).contains(&status) {
        let message = body
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        return Err(TransportError::new(kind_for_status(status), message));
    }

    let Some(body) = body else {
        return Err(TransportError::network("Response body is not valid JSON"));
    };

    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = extract_message(&body).unwrap_or_else(|| "Request failed".to_string());
        return Err(TransportError::server(message));
    }

    serde_json::from_value(body)
        .map_err(|e| TransportError::network(format!("Unexpected response shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde::de::IgnoredAny;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Token {
        access_token: String,
    }

    #[test]
    fn test_success_decodes() {
        let tok: Token = interpret(200, br#"{"access_token":"tok1"}"#).unwrap();
        assert_eq!(tok.access_token, "tok1");
    }

    #[test]
    fn test_401_and_403_are_unauthorized() {
        for status in [401, 403] {
            let err = interpret::<IgnoredAny>(status, br#"{"detail":"Not authenticated"}"#)
                .unwrap_err();
            assert_eq!(err.kind, TransportErrorKind::Unauthorized);
            assert_eq!(err.message, "Not authenticated");
        }
    }

    #[test]
    fn test_4xx_is_validation_with_detail() {
        let err =
            interpret::<IgnoredAny>(400, br#"{"detail":"Email already registered"}"#).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Validation);
        assert_eq!(err.message, "Email already registered");
    }

    #[test]
    fn test_detail_list_is_joined() {
        let body = br#"{"detail":[{"msg":"field required"},{"msg":"invalid email"}]}"#;
        let err = interpret::<IgnoredAny>(422, body).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Validation);
        assert_eq!(err.message, "field required; invalid email");
    }

    #[test]
    fn test_5xx_is_server_with_fallback_message() {
        let err = interpret::<IgnoredAny>(502, b"<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Server);
        assert_eq!(err.message, "Request failed with status 502");
    }

    #[test]
    fn test_success_false_is_server() {
        let err = interpret::<IgnoredAny>(200, br#"{"success":false,"error":"could not crawl"}"#)
            .unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Server);
        assert_eq!(err.message, "could not crawl");
    }

    #[test]
    fn test_success_true_passes_through() {
        #[derive(Deserialize)]
        struct Envelope {
            success: bool,
        }
        let env: Envelope = interpret(200, br#"{"success":true,"result":{}}"#).unwrap();
        assert!(env.success);
    }

    #[test]
    fn test_wrong_shape_is_network() {
        let err = interpret::<Token>(200, br#"{"unexpected":1}"#).unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Network);
    }

    #[test]
    fn test_empty_body_ok_for_ignored() {
        interpret::<IgnoredAny>(204, b"").unwrap();
    }

    #[test]
    fn test_error_key_beats_message_key_order() {
        let body: Value = serde_json::json!({"message": "m", "error": "e"});
        assert_eq!(extract_message(&body).as_deref(), Some("e"));
        let body: Value = serde_json::json!({"message": "m"});
        assert_eq!(extract_message(&body).as_deref(), Some("m"));
        assert_eq!(extract_message(&serde_json::json!({})), None);
    }
}
