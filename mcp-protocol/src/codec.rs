// mcp-protocol/src/codec.rs
//! Encoding and decoding of JSON-RPC envelopes.
//!
//! Decoding is lenient: unknown members are ignored and a missing `jsonrpc`
//! member defaults to `"2.0"`. The variant is inferred from the shape of the
//! object, never from a tag.

use crate::messages::{JsonRpcMessage, RawMessage};

/// Failure to turn text into a [`JsonRpcMessage`] or back.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("malformed JSON-RPC payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload matches no JSON-RPC message shape")]
    Shape,
}

/// Serialize a message to its wire text.
pub fn encode(message: &JsonRpcMessage) -> Result<String, CodecError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse wire text into a message.
pub fn decode(text: &str) -> Result<JsonRpcMessage, CodecError> {
    let raw: RawMessage = serde_json::from_str(text)?;
    JsonRpcMessage::try_from(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{error_codes, methods};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn infers_each_variant_from_shape() {
        let cases = [
            (
                json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}),
                JsonRpcMessage::request(1, methods::PING, None),
            ),
            (
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
                JsonRpcMessage::notification(methods::INITIALIZED, None),
            ),
            (
                json!({"jsonrpc": "2.0", "id": "abc", "result": {"ok": true}}),
                JsonRpcMessage::response("abc", json!({"ok": true})),
            ),
            (
                json!({"jsonrpc": "2.0", "id": 7, "error": {"code": -32601, "message": "nope"}}),
                JsonRpcMessage::error(7, error_codes::METHOD_NOT_FOUND, "nope", None),
            ),
        ];

        for (wire, expected) in cases {
            assert_eq!(decode(&wire.to_string()).unwrap(), expected);
        }
    }

    #[test]
    fn round_trips_through_text() {
        let messages = [
            JsonRpcMessage::request(
                "req-1",
                methods::INITIALIZE,
                Some(json!({"protocolVersion": "2024-11-05"})),
            ),
            JsonRpcMessage::notification(methods::INITIALIZED, None),
            JsonRpcMessage::response(3, Value::Null),
            JsonRpcMessage::error(
                4,
                error_codes::INTERNAL_ERROR,
                "boom",
                Some(json!({"detail": [1, 2]})),
            ),
        ];

        for message in messages {
            let text = encode(&message).unwrap();
            assert_eq!(decode(&text).unwrap(), message);
        }
    }

    #[test]
    fn encode_writes_version_and_omits_absent_members() {
        let text = encode(&JsonRpcMessage::notification(methods::INITIALIZED, None)).unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();

        assert_eq!(
            value,
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
        );
    }

    #[test]
    fn ignores_unknown_members_and_missing_version() {
        let message = decode(r#"{"id": 2, "method": "ping", "extra": {"nested": true}}"#).unwrap();
        assert_eq!(message, JsonRpcMessage::request(2, methods::PING, None));
    }

    #[test]
    fn request_shape_requires_no_result_or_error() {
        let message = decode(r#"{"id": 5, "method": "ping", "result": {}}"#).unwrap();
        assert_eq!(message, JsonRpcMessage::response(5, json!({})));
    }

    #[test]
    fn rejects_object_without_any_known_member() {
        let err = decode(r#"{"jsonrpc": "2.0", "params": {}}"#).unwrap_err();
        assert!(matches!(err, CodecError::Shape));

        let err = decode(r#"{"id": 9}"#).unwrap_err();
        assert!(matches!(err, CodecError::Shape));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(decode("{not json"), Err(CodecError::Json(_))));
        assert!(matches!(decode("[1, 2]"), Err(CodecError::Json(_))));
    }
}
