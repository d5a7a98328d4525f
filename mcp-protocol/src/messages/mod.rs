// mcp-protocol/src/messages/mod.rs
pub mod base;

pub use base::{JsonRpcError, JsonRpcMessage, RawMessage, RequestId};
