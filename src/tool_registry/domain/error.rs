//! Error types for tool registry domain validation.

use thiserror::Error;

/// Errors returned while constructing tool registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolRegistryDomainError {
    /// A tool definition name is empty after trimming.
    #[error("tool name must not be empty")]
    EmptyToolName,

    /// A tool listing entry is not a JSON object or lacks a name.
    #[error("malformed tool listing entry: {0}")]
    MalformedToolEntry(String),
}
