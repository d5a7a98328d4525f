// mcp-client/src/transport/mod.rs
pub mod callbacks;
pub mod memory;
mod set_once;
pub mod sse;

use async_trait::async_trait;
use mcp_protocol::messages::JsonRpcMessage;
use std::sync::{Mutex, PoisonError};

use crate::error::TransportError;

pub use callbacks::{Callbacks, CloseHandler, ErrorHandler, MessageHandler};
pub use memory::InMemoryTransport;
pub use sse::{SseClientTransport, SseClientTransportBuilder};

/// Lifecycle of a transport. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    NotStarted,
    Started,
    Closed,
}

/// Transport trait for sending and receiving MCP messages
///
/// Inbound messages, errors and the close notification are delivered through
/// the slots returned by [`Transport::callbacks`].
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Start the transport (listening for incoming messages)
    ///
    /// Fails with [`TransportError::AlreadyStarted`] on a second call.
    async fn start(&self) -> Result<(), TransportError>;

    /// Send a message to the peer
    async fn send(&self, message: JsonRpcMessage) -> Result<(), TransportError>;

    /// Close the transport
    ///
    /// No callback of this transport runs after `close` returns.
    async fn close(&self) -> Result<(), TransportError>;

    /// Callback slots for inbound messages, errors and close.
    fn callbacks(&self) -> &Callbacks;

    fn state(&self) -> TransportState;
}

/// Forward-only state cell shared by the transport implementations.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    state: Mutex<TransportState>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: Mutex::new(TransportState::NotStarted),
        }
    }
}

impl Lifecycle {
    pub(crate) fn get(&self) -> TransportState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move from `NotStarted` to `Started`.
    pub(crate) fn begin(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            TransportState::NotStarted => {
                *state = TransportState::Started;
                Ok(())
            }
            TransportState::Started => Err(TransportError::AlreadyStarted),
            TransportState::Closed => Err(TransportError::Closed),
        }
    }

    /// Move to `Closed`, returning the state it replaced.
    pub(crate) fn finish(&self) -> TransportState {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *state, TransportState::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_only_moves_forward() {
        let lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.get(), TransportState::NotStarted);

        lifecycle.begin().unwrap();
        assert!(matches!(lifecycle.begin(), Err(TransportError::AlreadyStarted)));
        assert_eq!(lifecycle.get(), TransportState::Started);

        assert_eq!(lifecycle.finish(), TransportState::Started);
        assert_eq!(lifecycle.finish(), TransportState::Closed);
        assert!(matches!(lifecycle.begin(), Err(TransportError::Closed)));
    }
}
