//! Adapter implementations for the tool source ports.
//!
//! [`McpConnector`] opens real MCP sessions; the [`memory`] adapters script
//! sources for tests and offline use.

pub mod jsonrpc;
pub mod mcp;
pub mod memory;
pub mod stdio;
pub mod streamable_http;

mod connector;

pub use connector::McpConnector;
pub use jsonrpc::ClientIdentity;
pub use memory::{InMemoryToolSource, InMemoryToolSourceConnector, RecordedCall};
