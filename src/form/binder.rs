//! Coercion of form values into call payloads.

use super::value::{FieldDescriptor, FormValue};
use crate::tool_registry::{
    domain::{DeclaredType, ParameterSchema},
    ports::Payload,
};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Values entered by the user, keyed by field name.
pub type FormInputs = BTreeMap<String, FormValue>;

/// A value could not be coerced to its field's declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormBindError {
    /// Integer field received something that is not a whole number.
    #[error("field '{field}' expects an integer, got '{value}'")]
    InvalidInteger {
        /// Field name.
        field: String,
        /// Offending value as text.
        value: String,
    },
    /// Number field received something that is not a finite number.
    #[error("field '{field}' expects a number, got '{value}'")]
    InvalidNumber {
        /// Field name.
        field: String,
        /// Offending value as text.
        value: String,
    },
    /// Boolean field received something that is not a truth value.
    #[error("field '{field}' expects true or false, got '{value}'")]
    InvalidBoolean {
        /// Field name.
        field: String,
        /// Offending value as text.
        value: String,
    },
}

/// Builds form fields from a schema and binds entered values to a payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormBinder;

impl FormBinder {
    /// Returns one descriptor per schema property, in declaration order.
    #[must_use]
    pub fn field_descriptors(schema: &ParameterSchema) -> Vec<FieldDescriptor> {
        schema
            .properties()
            .map(|(name, meta)| FieldDescriptor::new(name, meta, schema.is_required(name)))
            .collect()
    }

    /// Coerces `inputs` into a payload keyed exactly by the schema's
    /// properties.
    ///
    /// Fields without input take their type's default. Inputs for fields the
    /// schema does not declare are ignored. Required fields are not enforced;
    /// see [`FormBinder::missing_required`].
    ///
    /// # Errors
    ///
    /// Returns [`FormBindError`] for the first value that cannot be coerced.
    pub fn bind(schema: &ParameterSchema, inputs: &FormInputs) -> Result<Payload, FormBindError> {
        for name in inputs.keys() {
            if schema.field(name).is_none() {
                debug!(field = %name, "ignoring input for undeclared field");
            }
        }

        let mut payload = Payload::new();
        for (name, meta) in schema.properties() {
            let declared = meta.declared_type();
            let value = match inputs.get(name) {
                Some(entered) => coerce(name, declared, entered)?,
                None => coerce(name, declared, &FormValue::default_for(declared))?,
            };
            payload.insert(name.to_owned(), value);
        }
        Ok(payload)
    }

    /// Returns required fields that have no input or only blank text.
    #[must_use]
    pub fn missing_required<'a>(schema: &'a ParameterSchema, inputs: &FormInputs) -> Vec<&'a str> {
        schema
            .field_names()
            .into_iter()
            .filter(|name| schema.is_required(name))
            .filter(|name| inputs.get(*name).is_none_or(FormValue::is_blank))
            .collect()
    }
}

fn coerce(field: &str, declared: DeclaredType, entered: &FormValue) -> Result<Value, FormBindError> {
    match declared {
        DeclaredType::String | DeclaredType::Unknown => Ok(Value::String(entered.to_string())),
        DeclaredType::Integer => coerce_integer(entered)
            .map(Value::from)
            .ok_or_else(|| FormBindError::InvalidInteger {
                field: field.to_owned(),
                value: entered.to_string(),
            }),
        DeclaredType::Number => coerce_number(entered)
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| FormBindError::InvalidNumber {
                field: field.to_owned(),
                value: entered.to_string(),
            }),
        DeclaredType::Boolean => coerce_boolean(entered)
            .map(Value::Bool)
            .ok_or_else(|| FormBindError::InvalidBoolean {
                field: field.to_owned(),
                value: entered.to_string(),
            }),
    }
}

fn coerce_integer(entered: &FormValue) -> Option<i64> {
    match entered {
        FormValue::Integer(number) => Some(*number),
        FormValue::Text(text) => text.trim().parse().ok(),
        // Whole floats display without a fraction; parsing rejects the rest.
        FormValue::Number(number) => number.to_string().parse().ok(),
        FormValue::Boolean(_) => None,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integer input widens to a JSON number the same way a form widget would"
)]
fn coerce_number(entered: &FormValue) -> Option<f64> {
    let number = match entered {
        FormValue::Number(number) => *number,
        FormValue::Integer(number) => *number as f64,
        FormValue::Text(text) => text.trim().parse().ok()?,
        FormValue::Boolean(_) => return None,
    };
    number.is_finite().then_some(number)
}

fn coerce_boolean(entered: &FormValue) -> Option<bool> {
    match entered {
        FormValue::Boolean(flag) => Some(*flag),
        FormValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" | "on" => Some(true),
            "false" | "no" | "0" | "off" => Some(false),
            _ => None,
        },
        FormValue::Integer(_) | FormValue::Number(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn schema() -> ParameterSchema {
        ParameterSchema::from_json(&json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "description": "Search text"},
                "limit": {"type": "integer"},
                "threshold": {"type": "number"},
                "exact": {"type": "boolean"},
                "tags": {"type": "array"}
            },
            "required": ["query", "ghost"]
        }))
    }

    fn inputs(pairs: &[(&str, FormValue)]) -> FormInputs {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[rstest]
    fn descriptors_follow_declaration_order(schema: ParameterSchema) {
        let descriptors = FormBinder::field_descriptors(&schema);

        let labels: Vec<&str> = descriptors.iter().map(|field| field.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "query (string) *",
                "limit (integer)",
                "threshold (number)",
                "exact (boolean)",
                "tags (array)"
            ]
        );
    }

    #[rstest]
    fn empty_inputs_bind_every_field_to_its_default(schema: ParameterSchema) {
        let payload = FormBinder::bind(&schema, &FormInputs::new()).expect("binding should succeed");

        assert_eq!(
            Value::Object(payload),
            json!({"query": "", "limit": 0, "threshold": 0.0, "exact": false, "tags": ""})
        );
    }

    #[rstest]
    fn text_inputs_are_coerced_and_unknown_fields_ignored(schema: ParameterSchema) {
        let entered = inputs(&[
            ("query", FormValue::from("rust")),
            ("limit", FormValue::from(" 5 ")),
            ("threshold", FormValue::from("0.25")),
            ("exact", FormValue::from("Yes")),
            ("extra", FormValue::from("dropped")),
        ]);

        let payload = FormBinder::bind(&schema, &entered).expect("binding should succeed");

        let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["query", "limit", "threshold", "exact", "tags"]);
        assert_eq!(payload.get("limit"), Some(&json!(5)));
        assert_eq!(payload.get("threshold"), Some(&json!(0.25)));
        assert_eq!(payload.get("exact"), Some(&json!(true)));
    }

    #[rstest]
    #[case(FormValue::from("12"), Some(12))]
    #[case(FormValue::Integer(-3), Some(-3))]
    #[case(FormValue::Number(4.0), Some(4))]
    #[case(FormValue::Number(4.5), None)]
    #[case(FormValue::Number(f64::NAN), None)]
    #[case(FormValue::from("twelve"), None)]
    #[case(FormValue::Boolean(true), None)]
    fn integer_coercion(#[case] entered: FormValue, #[case] expected: Option<i64>) {
        assert_eq!(coerce_integer(&entered), expected);
    }

    #[rstest]
    #[case(FormValue::from("1e3"), Some(1000.0))]
    #[case(FormValue::Integer(7), Some(7.0))]
    #[case(FormValue::from("inf"), None)]
    #[case(FormValue::Number(f64::INFINITY), None)]
    fn number_coercion(#[case] entered: FormValue, #[case] expected: Option<f64>) {
        assert_eq!(coerce_number(&entered), expected);
    }

    #[rstest]
    fn invalid_values_name_the_field(schema: ParameterSchema) {
        let entered = inputs(&[("exact", FormValue::from("maybe"))]);

        let result = FormBinder::bind(&schema, &entered);

        assert_eq!(
            result,
            Err(FormBindError::InvalidBoolean {
                field: "exact".to_owned(),
                value: "maybe".to_owned()
            })
        );
    }

    #[rstest]
    #[case(&[], vec!["query"])]
    #[case(&[("query", FormValue::from("  "))], vec!["query"])]
    #[case(&[("query", FormValue::from("rust"))], vec![])]
    fn missing_required_ignores_dangling_names(
        schema: ParameterSchema,
        #[case] pairs: &[(&str, FormValue)],
        #[case] expected: Vec<&str>,
    ) {
        assert_eq!(FormBinder::missing_required(&schema, &inputs(pairs)), expected);
    }
}
