// mcp-client/src/transport/memory.rs
use async_trait::async_trait;
use mcp_protocol::messages::JsonRpcMessage;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Callbacks, Lifecycle, Transport, TransportState};
use crate::error::TransportError;

/// Messages addressed to one side of a pair.
#[derive(Default)]
struct Inbox {
    started: bool,
    pending: VecDeque<JsonRpcMessage>,
}

#[derive(Default)]
struct Side {
    lifecycle: Lifecycle,
    callbacks: Callbacks,
    inbox: Mutex<Inbox>,
}

impl Side {
    async fn shutdown(&self) {
        if self.lifecycle.finish() != TransportState::Closed {
            debug!("Closing in-memory transport");
        }
        self.inbox.lock().await.pending.clear();
        self.callbacks.close();
    }
}

/// Transport that delivers typed messages directly to a linked peer in the
/// same process, without serialization.
///
/// Messages sent before the peer has started are queued and handed to the
/// peer's message handler, in order, when it starts.
pub struct InMemoryTransport {
    local: Arc<Side>,
    remote: Arc<Side>,
}

impl InMemoryTransport {
    /// Create two transports wired to each other
    pub fn linked_pair() -> (Self, Self) {
        let client = Arc::new(Side::default());
        let server = Arc::new(Side::default());

        (
            Self {
                local: client.clone(),
                remote: server.clone(),
            },
            Self {
                local: server,
                remote: client,
            },
        )
    }

    fn fail(&self, err: TransportError) -> Result<(), TransportError> {
        self.local.callbacks.error(&err);
        Err(err)
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn start(&self) -> Result<(), TransportError> {
        if let Err(err) = self.local.lifecycle.begin() {
            return self.fail(err);
        }

        let mut inbox = self.local.inbox.lock().await;
        let queued = inbox.pending.len();
        while let Some(message) = inbox.pending.pop_front() {
            self.local.callbacks.message(message);
        }
        inbox.started = true;

        debug!("In-memory transport started, delivered {} queued messages", queued);
        Ok(())
    }

    async fn send(&self, message: JsonRpcMessage) -> Result<(), TransportError> {
        if self.local.lifecycle.get() == TransportState::Closed {
            return self.fail(TransportError::Closed);
        }

        let mut inbox = self.remote.inbox.lock().await;
        if self.remote.lifecycle.get() == TransportState::Closed {
            drop(inbox);
            return self.fail(TransportError::Closed);
        }

        if inbox.started {
            self.remote.callbacks.message(message);
        } else {
            inbox.pending.push_back(message);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.remote.shutdown().await;
        self.local.shutdown().await;
        Ok(())
    }

    fn callbacks(&self) -> &Callbacks {
        &self.local.callbacks
    }

    fn state(&self) -> TransportState {
        self.local.lifecycle.get()
    }
}
