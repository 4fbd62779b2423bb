//! Parameter schema model read from loosely-typed JSON Schema objects.
//!
//! Tool servers declare inputs as JSON Schema fragments of varying quality.
//! Parsing here is total: missing or odd pieces degrade to permissive
//! defaults instead of failing, and each degradation is logged at `debug`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Declared type of one input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredType {
    /// Free text.
    String,
    /// Whole number.
    Integer,
    /// Floating-point number.
    Number,
    /// True/false toggle.
    Boolean,
    /// Missing or unrecognized type; handled as text.
    Unknown,
}

impl DeclaredType {
    /// Reads the `type` keyword of a property schema.
    ///
    /// A type array such as `["integer", "null"]` uses its first non-`null`
    /// entry. Anything unreadable is [`DeclaredType::Unknown`].
    #[must_use]
    pub fn from_schema_type(value: Option<&Value>) -> Self {
        type_name_of(value).map_or(Self::Unknown, Self::from_name)
    }

    /// Maps a JSON Schema type name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "string" => Self::String,
            "integer" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::Unknown,
        }
    }

    /// Returns the canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Unknown => "unknown",
        }
    }

    /// Returns whether values of this type are handled as text.
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Unknown)
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Metadata for one property of a parameter schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMeta {
    declared_type: DeclaredType,
    type_name: Option<String>,
    description: Option<String>,
}

impl FieldMeta {
    /// Creates metadata for a field of the given type.
    #[must_use]
    pub fn new(declared_type: DeclaredType) -> Self {
        Self {
            declared_type,
            type_name: Some(declared_type.as_str().to_owned()),
            description: None,
        }
    }

    /// Reads metadata from a property schema object.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        let type_value = value.get("type");
        let description = value
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        Self {
            declared_type: DeclaredType::from_schema_type(type_value),
            type_name: type_name_of(type_value).map(str::to_owned),
            description,
        }
    }

    /// Returns the parsed type.
    #[must_use]
    pub const fn declared_type(&self) -> DeclaredType {
        self.declared_type
    }

    /// Returns the type name shown to users.
    ///
    /// Unrecognized types keep their declared name (for example `array`);
    /// a missing type reads as `string`, matching how it is handled.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.type_name.as_deref().unwrap_or("string")
    }

    /// Returns the property description, when declared.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Parameter schema of a tool: ordered properties plus required names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSchema {
    properties: Vec<(String, FieldMeta)>,
    required: BTreeSet<String>,
}

impl ParameterSchema {
    /// Builds a schema from explicit parts.
    ///
    /// Required names without a matching property are dropped.
    #[must_use]
    pub fn new(
        properties: impl IntoIterator<Item = (String, FieldMeta)>,
        required: impl IntoIterator<Item = String>,
    ) -> Self {
        let collected: Vec<(String, FieldMeta)> = properties.into_iter().collect();
        let known: BTreeSet<String> = required
            .into_iter()
            .filter(|name| {
                let is_declared = collected.iter().any(|(property, _)| property == name);
                if !is_declared {
                    debug!(field = %name, "required field has no property; treating as optional");
                }
                is_declared
            })
            .collect();

        Self {
            properties: collected,
            required: known,
        }
    }

    /// Parses a JSON Schema object. Never fails.
    #[must_use]
    pub fn from_json(schema: &Value) -> Self {
        let properties: Vec<(String, FieldMeta)> = match schema.get("properties") {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(name, meta)| (name.clone(), FieldMeta::from_json(meta)))
                .collect(),
            Some(other) => {
                debug!(properties = %other, "schema properties is not an object; ignoring");
                Vec::new()
            }
            None => Vec::new(),
        };

        let required: Vec<String> = match schema.get("required") {
            Some(Value::Array(names)) => names
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect(),
            Some(other) => {
                debug!(required = %other, "schema required is not an array; ignoring");
                Vec::new()
            }
            None => Vec::new(),
        };

        Self::new(properties, required)
    }

    /// Returns properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &FieldMeta)> {
        self.properties
            .iter()
            .map(|(name, meta)| (name.as_str(), meta))
    }

    /// Returns property names in declaration order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.properties.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Returns the metadata of a property.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldMeta> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, meta)| meta)
    }

    /// Returns whether a property is required.
    #[must_use]
    pub fn is_required(&self, name: &str) -> bool {
        self.required.contains(name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns whether the schema declares no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

fn type_name_of(value: Option<&Value>) -> Option<&str> {
    match value? {
        Value::String(name) => Some(name.as_str()),
        Value::Array(names) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null"),
        _ => None,
    }
}
