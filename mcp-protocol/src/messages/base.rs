// mcp-protocol/src/messages/base.rs
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::codec::CodecError;
use crate::constants::JSONRPC_VERSION;

/// Identifier correlating a request with its response.
///
/// Unique per open connection; no ordering is implied between ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Number(n) => write!(f, "{}", n),
            RequestId::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RequestId {
    fn from(id: i64) -> Self {
        RequestId::Number(id)
    }
}

impl From<i32> for RequestId {
    fn from(id: i32) -> Self {
        RequestId::Number(i64::from(id))
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        RequestId::String(id.to_string())
    }
}

impl From<String> for RequestId {
    fn from(id: String) -> Self {
        RequestId::String(id)
    }
}

/// JSON-RPC 2.0 error structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Represents a JSON-RPC 2.0 message.
///
/// The wire format has no discriminator field, so the variant is inferred
/// from which members are present (see [`RawMessage`]). Unknown members are
/// ignored on decode; `None` members are omitted on encode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMessage", into = "RawMessage")]
pub enum JsonRpcMessage {
    /// A request from client to server or vice versa
    Request {
        id: RequestId,
        method: String,
        params: Option<serde_json::Value>,
    },

    /// A notification (one-way message with no response)
    Notification {
        method: String,
        params: Option<serde_json::Value>,
    },

    /// A successful response to a request
    Response {
        id: RequestId,
        result: serde_json::Value,
    },

    /// A failed response to a request
    ErrorResponse { id: RequestId, error: JsonRpcError },
}

impl JsonRpcMessage {
    /// Create a new request
    pub fn request(
        id: impl Into<RequestId>,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Self {
        JsonRpcMessage::Request {
            id: id.into(),
            method: method.to_string(),
            params,
        }
    }

    /// Create a new response with a result
    pub fn response(id: impl Into<RequestId>, result: serde_json::Value) -> Self {
        JsonRpcMessage::Response {
            id: id.into(),
            result,
        }
    }

    /// Create a new error response
    pub fn error(
        id: impl Into<RequestId>,
        code: i32,
        message: &str,
        data: Option<serde_json::Value>,
    ) -> Self {
        JsonRpcMessage::ErrorResponse {
            id: id.into(),
            error: JsonRpcError {
                code,
                message: message.to_string(),
                data,
            },
        }
    }

    /// Create a new notification
    pub fn notification(method: &str, params: Option<serde_json::Value>) -> Self {
        JsonRpcMessage::Notification {
            method: method.to_string(),
            params,
        }
    }

    /// The request id, absent on notifications
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Request { id, .. }
            | JsonRpcMessage::Response { id, .. }
            | JsonRpcMessage::ErrorResponse { id, .. } => Some(id),
            JsonRpcMessage::Notification { .. } => None,
        }
    }

    /// The method name, present on requests and notifications
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request { method, .. } | JsonRpcMessage::Notification { method, .. } => {
                Some(method.as_str())
            }
            _ => None,
        }
    }
}

/// Flat wire form of a message: every member any variant may carry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMessage {
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

// A member that is present but `null` still counts as present.
fn present<'de, D>(deserializer: D) -> Result<Option<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl TryFrom<RawMessage> for JsonRpcMessage {
    type Error = CodecError;

    fn try_from(raw: RawMessage) -> Result<Self, Self::Error> {
        // Checked in order; the first matching shape wins.
        match raw {
            RawMessage {
                id: Some(id),
                method: Some(method),
                params,
                result: None,
                error: None,
                ..
            } => Ok(JsonRpcMessage::Request { id, method, params }),
            RawMessage {
                id: None,
                method: Some(method),
                params,
                ..
            } => Ok(JsonRpcMessage::Notification { method, params }),
            RawMessage {
                id: Some(id),
                result: Some(result),
                ..
            } => Ok(JsonRpcMessage::Response { id, result }),
            RawMessage {
                id: Some(id),
                error: Some(error),
                ..
            } => Ok(JsonRpcMessage::ErrorResponse { id, error }),
            _ => Err(CodecError::Shape),
        }
    }
}

impl From<JsonRpcMessage> for RawMessage {
    fn from(message: JsonRpcMessage) -> Self {
        let raw = RawMessage {
            jsonrpc: default_version(),
            ..Default::default()
        };

        match message {
            JsonRpcMessage::Request { id, method, params } => RawMessage {
                id: Some(id),
                method: Some(method),
                params,
                ..raw
            },
            JsonRpcMessage::Notification { method, params } => RawMessage {
                method: Some(method),
                params,
                ..raw
            },
            JsonRpcMessage::Response { id, result } => RawMessage {
                id: Some(id),
                result: Some(result),
                ..raw
            },
            JsonRpcMessage::ErrorResponse { id, error } => RawMessage {
                id: Some(id),
                error: Some(error),
                ..raw
            },
        }
    }
}
