// mcp-client/src/transport/callbacks.rs
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use mcp_protocol::messages::JsonRpcMessage;

use crate::error::TransportError;

/// Handler invoked for each inbound message.
pub type MessageHandler = Arc<dyn Fn(JsonRpcMessage) + Send + Sync>;

/// Handler invoked for each reported error.
pub type ErrorHandler = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Handler invoked once when the transport closes.
pub type CloseHandler = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Slots {
    on_message: Option<MessageHandler>,
    on_error: Option<ErrorHandler>,
    on_close: Option<CloseHandler>,
}

/// The three callback slots of a transport.
///
/// Each slot holds at most one handler and the last assignment wins; slots may
/// be reassigned at any time. Handlers of one transport are never run
/// concurrently with each other, and none runs once the close handler has
/// fired.
///
/// Handlers run on the transport's own task while a blocking lock is held,
/// and `close` waits for a running handler to return. Keep them short and
/// non-blocking; hand longer work to a channel or a spawned task.
#[derive(Default)]
pub struct Callbacks {
    slots: RwLock<Slots>,
    // Held while a handler runs; the flag records that `on_close` has fired.
    dispatch: Mutex<bool>,
}

impl Callbacks {
    pub fn on_message<F>(&self, handler: F)
    where
        F: Fn(JsonRpcMessage) + Send + Sync + 'static,
    {
        self.write_slots().on_message = Some(Arc::new(handler));
    }

    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.write_slots().on_error = Some(Arc::new(handler));
    }

    pub fn on_close<F>(&self, handler: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.write_slots().on_close = Some(Arc::new(handler));
    }

    /// Remove every assigned handler.
    pub fn clear(&self) {
        *self.write_slots() = Slots::default();
    }

    pub(crate) fn message(&self, message: JsonRpcMessage) {
        let closed = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            tracing::debug!("Dropping message received after close");
            return;
        }

        let handler = self.read_slots().on_message.clone();
        match handler {
            Some(handler) => handler(message),
            None => tracing::debug!("No message handler set, dropping message"),
        }
    }

    pub(crate) fn error(&self, err: &TransportError) {
        let closed = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::error!("Transport error: {}", err);
        if *closed {
            return;
        }

        let handler = self.read_slots().on_error.clone();
        if let Some(handler) = handler {
            handler(err);
        }
    }

    /// Fire `on_close` unless it already fired. Returns whether this call fired it.
    pub(crate) fn close(&self) -> bool {
        let mut closed = self.dispatch.lock().unwrap_or_else(PoisonError::into_inner);
        if *closed {
            return false;
        }
        *closed = true;

        let handler = self.read_slots().on_close.clone();
        if let Some(handler) = handler {
            handler();
        }
        true
    }

    fn read_slots(&self) -> std::sync::RwLockReadGuard<'_, Slots> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slots(&self) -> std::sync::RwLockWriteGuard<'_, Slots> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}
