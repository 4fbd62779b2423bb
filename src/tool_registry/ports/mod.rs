//! Port contracts for tool discovery and invocation.

mod source;

#[cfg(test)]
pub use source::{MockToolSource, MockToolSourceConnector};
pub use source::{Payload, ToolSource, ToolSourceConnector, ToolSourceError, ToolSourceResult};
