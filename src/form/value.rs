//! Form field values and descriptors.

use crate::tool_registry::domain::{DeclaredType, FieldMeta};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One value entered into a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    /// Free text.
    Text(String),
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Number(f64),
    /// Toggle state.
    Boolean(bool),
}

impl FormValue {
    /// Returns the initial value for a field of `declared_type`.
    #[must_use]
    pub const fn default_for(declared_type: DeclaredType) -> Self {
        match declared_type {
            DeclaredType::String | DeclaredType::Unknown => Self::Text(String::new()),
            DeclaredType::Integer => Self::Integer(0),
            DeclaredType::Number => Self::Number(0.0),
            DeclaredType::Boolean => Self::Boolean(false),
        }
    }

    /// Returns whether this is blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FormValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl fmt::Display for FormValue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => formatter.write_str(text),
            Self::Integer(number) => write!(formatter, "{number}"),
            Self::Number(number) => write!(formatter, "{number}"),
            Self::Boolean(flag) => write!(formatter, "{flag}"),
        }
    }
}

/// Everything a front end needs to render one input.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Property name, used as the payload key.
    pub name: String,
    /// Parsed type driving the widget and coercion.
    pub declared_type: DeclaredType,
    /// Type name shown to users.
    pub type_label: String,
    /// Whether the schema lists the field as required.
    pub required: bool,
    /// Initial widget value.
    pub default: FormValue,
    /// Display label: `name (type)` with a trailing ` *` when required.
    pub label: String,
    /// Property description, when declared.
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Builds the descriptor for property `name`.
    #[must_use]
    pub fn new(name: &str, meta: &FieldMeta, required: bool) -> Self {
        let type_label = meta.type_label().to_owned();
        let marker = if required { " *" } else { "" };
        Self {
            name: name.to_owned(),
            declared_type: meta.declared_type(),
            label: format!("{name} ({type_label}){marker}"),
            type_label,
            required,
            default: FormValue::default_for(meta.declared_type()),
            description: meta.description().map(str::to_owned),
        }
    }
}
