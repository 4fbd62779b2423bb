//! Domain model for tool discovery.
//!
//! The tool registry domain models aggregate session identity, discovered
//! tool metadata, and the parameter schemas tools declare. Transport and
//! process concerns remain outside this boundary.

mod error;
mod ids;
mod schema;
mod tool;

pub use error::ToolRegistryDomainError;
pub use ids::SessionId;
pub use schema::{DeclaredType, FieldMeta, ParameterSchema};
pub use tool::ToolDefinition;
