// mcp-protocol/src/lib.rs
pub mod codec;
pub mod constants;
pub mod messages;

// Re-export commonly used items
pub use codec::{decode, encode, CodecError};
pub use constants::{JSONRPC_VERSION, PROTOCOL_VERSION};
pub use messages::{JsonRpcError, JsonRpcMessage, RequestId};
