// mcp-client/src/error.rs
use std::sync::Arc;

use mcp_protocol::CodecError;

/// Broad category of a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The peer broke the transport protocol (bad endpoint, SSE `error` event).
    Protocol,
    /// The operation is not valid in the transport's current state.
    State,
    /// A payload could not be encoded or decoded.
    Codec,
    /// HTTP or connection failure.
    Network,
}

/// Errors raised by transports and reported through their error callback.
///
/// Cloneable so that one failure can be handed to every caller waiting on it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid endpoint {endpoint:?}: {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },

    #[error("SSE error: {0}")]
    ServerEvent(String),

    #[error("malformed event stream: {0}")]
    MalformedStream(String),

    #[error("event stream ended before the endpoint was announced")]
    StreamEnded,

    #[error("transport already started")]
    AlreadyStarted,

    #[error("transport not started")]
    NotStarted,

    #[error("transport is closed")]
    Closed,

    #[error(transparent)]
    Codec(Arc<CodecError>),

    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

impl TransportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::InvalidUrl { .. }
            | TransportError::InvalidEndpoint { .. }
            | TransportError::ServerEvent(_)
            | TransportError::MalformedStream(_)
            | TransportError::StreamEnded => ErrorKind::Protocol,
            TransportError::AlreadyStarted | TransportError::NotStarted | TransportError::Closed => {
                ErrorKind::State
            }
            TransportError::Codec(_) => ErrorKind::Codec,
            TransportError::Network(_) | TransportError::HttpStatus { .. } => ErrorKind::Network,
        }
    }
}

impl From<CodecError> for TransportError {
    fn from(err: CodecError) -> Self {
        TransportError::Codec(Arc::new(err))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(Arc::new(err))
    }
}

impl From<eventsource_stream::EventStreamError<reqwest::Error>> for TransportError {
    fn from(err: eventsource_stream::EventStreamError<reqwest::Error>) -> Self {
        match err {
            eventsource_stream::EventStreamError::Transport(err) => err.into(),
            other => TransportError::MalformedStream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(TransportError::AlreadyStarted.kind(), ErrorKind::State);
        assert_eq!(TransportError::Closed.kind(), ErrorKind::State);
        assert_eq!(
            TransportError::ServerEvent("boom".into()).kind(),
            ErrorKind::Protocol
        );
        assert_eq!(
            TransportError::from(CodecError::Shape).kind(),
            ErrorKind::Codec
        );
        assert_eq!(
            TransportError::HttpStatus {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: String::new(),
            }
            .kind(),
            ErrorKind::Network
        );
    }

    #[test]
    fn http_status_carries_the_body() {
        let err = TransportError::HttpStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            body: "no such session".into(),
        };
        assert!(err.to_string().contains("no such session"));
        assert!(err.to_string().contains("404"));
    }
}
