//! Conversion of raw tool results into display shapes.
//!
//! Tools answer with whatever JSON they like. The normalizer applies an
//! ordered chain of shape matchers; the first that accepts the value decides
//! the display shape. Normalization is pure.

use serde::Serialize;
use serde_json::{Value, json};

/// Result shaped for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DisplayResult {
    /// One row per element, shown as a table.
    TabularRows(Vec<Value>),
    /// A single value shown as text.
    ScalarText(String),
}

impl DisplayResult {
    /// Returns the rows when the result is tabular.
    #[must_use]
    pub fn rows(&self) -> Option<&[Value]> {
        match self {
            Self::TabularRows(rows) => Some(rows),
            Self::ScalarText(_) => None,
        }
    }
}

type Matcher = fn(&Value) -> Option<DisplayResult>;

const MATCHERS: [Matcher; 3] = [decoded_text_rows, structured_rows, scalar_text];

/// Normalizes a raw result. Always yields a display shape.
#[must_use]
pub fn normalize(raw: &Value) -> DisplayResult {
    MATCHERS
        .iter()
        .find_map(|matcher| matcher(raw))
        .unwrap_or_else(|| DisplayResult::ScalarText(raw.to_string()))
}

/// An array of strings, each holding JSON text. Undecodable elements are
/// kept as `{"raw": text}` rows.
fn decoded_text_rows(raw: &Value) -> Option<DisplayResult> {
    let elements = raw.as_array()?;
    let texts: Vec<&str> = elements
        .iter()
        .map(Value::as_str)
        .collect::<Option<Vec<&str>>>()?;

    let rows = texts
        .into_iter()
        .map(|text| serde_json::from_str::<Value>(text).unwrap_or_else(|_| json!({ "raw": text })))
        .collect();
    Some(DisplayResult::TabularRows(rows))
}

fn structured_rows(raw: &Value) -> Option<DisplayResult> {
    match raw {
        Value::Object(_) => Some(DisplayResult::TabularRows(vec![raw.clone()])),
        Value::Array(elements) => Some(DisplayResult::TabularRows(elements.clone())),
        _ => None,
    }
}

fn scalar_text(raw: &Value) -> Option<DisplayResult> {
    let text = match raw {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(DisplayResult::ScalarText(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        json!(["{\"a\":1}", "{\"a\":2}"]),
        DisplayResult::TabularRows(vec![json!({"a": 1}), json!({"a": 2})])
    )]
    #[case(
        json!(["{\"a\":1}", "not json"]),
        DisplayResult::TabularRows(vec![json!({"a": 1}), json!({"raw": "not json"})])
    )]
    #[case(json!(["[1,2]", "3"]), DisplayResult::TabularRows(vec![json!([1, 2]), json!(3)]))]
    #[case(json!([]), DisplayResult::TabularRows(vec![]))]
    fn string_arrays_are_decoded_per_element(#[case] raw: Value, #[case] expected: DisplayResult) {
        assert_eq!(normalize(&raw), expected);
    }

    #[rstest]
    #[case(json!({"total": 3}), DisplayResult::TabularRows(vec![json!({"total": 3})]))]
    #[case(json!([{"a": 1}, 2]), DisplayResult::TabularRows(vec![json!({"a": 1}), json!(2)]))]
    #[case(json!(["{}", 5]), DisplayResult::TabularRows(vec![json!("{}"), json!(5)]))]
    fn objects_and_mixed_arrays_become_rows(#[case] raw: Value, #[case] expected: DisplayResult) {
        assert_eq!(normalize(&raw), expected);
    }

    #[rstest]
    #[case(json!("done"), "done")]
    #[case(json!(42), "42")]
    #[case(json!(true), "true")]
    #[case(Value::Null, "null")]
    fn scalars_become_text(#[case] raw: Value, #[case] expected: &str) {
        assert_eq!(normalize(&raw), DisplayResult::ScalarText(expected.to_owned()));
    }

    #[test]
    fn normalization_is_deterministic() {
        let raw = json!(["{\"a\":1}", "oops"]);
        assert_eq!(normalize(&raw), normalize(&raw));
    }
}
