//! Tool definition value object.

use super::{ParameterSchema, ToolRegistryDomainError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata for a tool exposed by a remote tool source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: Value,
}

impl ToolDefinition {
    /// Creates a tool definition.
    ///
    /// The description may be empty; many servers omit it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::EmptyToolName`] when the name is
    /// empty after trimming.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
    ) -> Result<Self, ToolRegistryDomainError> {
        let normalized_name = name.into().trim().to_owned();
        if normalized_name.is_empty() {
            return Err(ToolRegistryDomainError::EmptyToolName);
        }

        Ok(Self {
            name: normalized_name,
            description: description.into().trim().to_owned(),
            input_schema,
        })
    }

    /// Builds a definition from one entry of an MCP `tools/list` result.
    ///
    /// Reads `name`, `description`, and `inputSchema` (or `input_schema`).
    /// A missing schema becomes an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryDomainError::MalformedToolEntry`] when the entry
    /// is not an object or has no string name, and
    /// [`ToolRegistryDomainError::EmptyToolName`] for a blank name.
    pub fn from_listing_entry(entry: &Value) -> Result<Self, ToolRegistryDomainError> {
        let object = entry
            .as_object()
            .ok_or_else(|| ToolRegistryDomainError::MalformedToolEntry(entry.to_string()))?;
        let name = object
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolRegistryDomainError::MalformedToolEntry(entry.to_string()))?;
        let description = object
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let input_schema = object
            .get("inputSchema")
            .or_else(|| object.get("input_schema"))
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        Self::new(name, description, input_schema)
    }

    /// Returns the tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the tool description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the raw input schema as declared by the server.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Parses the input schema into a [`ParameterSchema`].
    #[must_use]
    pub fn parameter_schema(&self) -> ParameterSchema {
        ParameterSchema::from_json(&self.input_schema)
    }
}
