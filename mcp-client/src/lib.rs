// mcp-client/src/lib.rs
pub mod error;
pub mod transport;

pub use error::{ErrorKind, TransportError};
pub use transport::{
    Callbacks, InMemoryTransport, SseClientTransport, SseClientTransportBuilder, Transport,
    TransportState,
};

pub use mcp_protocol;
