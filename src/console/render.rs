//! Plain-text rendering for console output.

use crate::endpoint::domain::EndpointRegistry;
use crate::form::FieldDescriptor;
use crate::invocation::DisplayResult;
use crate::session::ConnectReport;
use serde_json::Value;

/// Column used for rows that are not JSON objects.
const VALUE_COLUMN: &str = "value";

/// Lists endpoints as `n. address (transport)`.
#[must_use]
pub fn render_servers(registry: &EndpointRegistry) -> String {
    registry
        .descriptors()
        .iter()
        .enumerate()
        .map(|(index, descriptor)| format!("{}. {descriptor}", index.saturating_add(1)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarizes a connect attempt, warnings first.
#[must_use]
pub fn render_report(report: &ConnectReport) -> String {
    let mut lines: Vec<String> = report
        .warnings
        .iter()
        .map(|warning| format!("warning: {warning}"))
        .collect();

    match &report.failure {
        Some(failure) => lines.push(format!("error: {failure}")),
        None => lines.push(format!(
            "Connected to {} server(s); {} tool(s) available.",
            report.server_count, report.tool_count
        )),
    }
    lines.join("\n")
}

/// Renders a tool's input form, one field per line.
#[must_use]
pub fn render_fields(tool: &str, description: &str, fields: &[FieldDescriptor]) -> String {
    let mut out = format!("Tool: {tool}");
    if !description.is_empty() {
        out.push_str(&format!("\n{description}"));
    }
    if fields.is_empty() {
        out.push_str("\n(no input fields)");
        return out;
    }

    let width = fields
        .iter()
        .map(|field| field.label.chars().count())
        .max()
        .unwrap_or(0);
    for field in fields {
        out.push_str(&format!(
            "\n  {label:<width$}  default: {default}",
            label = field.label,
            default = field.default
        ));
        if let Some(text) = &field.description {
            out.push_str(&format!("  - {text}"));
        }
    }
    out
}

/// Renders a normalized result as a table or as text.
#[must_use]
pub fn render_result(result: &DisplayResult) -> String {
    match result {
        DisplayResult::ScalarText(text) => text.clone(),
        DisplayResult::TabularRows(rows) => render_rows(rows),
    }
}

/// Renders rows as an aligned table.
///
/// Columns are the union of object keys in first-seen order. Non-object rows
/// fill a `value` column.
#[must_use]
pub fn render_rows(rows: &[Value]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_owned();
    }

    let columns = collect_columns(rows);
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| cell_text(row, column)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(position, column)| {
            cells
                .iter()
                .filter_map(|row| row.get(position))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = vec![
        format_line(columns.iter().map(String::as_str), &widths),
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-"),
    ];
    lines.extend(
        cells
            .iter()
            .map(|row| format_line(row.iter().map(String::as_str), &widths)),
    );
    lines.join("\n")
}

fn collect_columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        let keys: Vec<&str> = match row {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            _ => vec![VALUE_COLUMN],
        };
        for key in keys {
            if !columns.iter().any(|column| column == key) {
                columns.push(key.to_owned());
            }
        }
    }
    columns
}

fn cell_text(row: &Value, column: &str) -> String {
    let cell = match row {
        Value::Object(map) => map.get(column),
        other if column == VALUE_COLUMN => Some(other),
        _ => None,
    };
    match cell {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_owned()
}
