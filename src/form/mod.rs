//! Schema-driven input forms.
//!
//! A tool's [`ParameterSchema`](crate::tool_registry::domain::ParameterSchema)
//! is turned into [`FieldDescriptor`]s a front end can render, and the values
//! a user entered are coerced back into a call
//! [`Payload`](crate::tool_registry::ports::Payload). Binding is permissive:
//! every declared field gets a value and required fields are only reported,
//! never enforced.

mod binder;
mod value;

pub use binder::{FormBindError, FormBinder, FormInputs};
pub use value::{FieldDescriptor, FormValue};
