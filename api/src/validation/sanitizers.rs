//! Input sanitization functions
//!
//! Raw form values arrive untyped. These functions narrow them to trimmed
//! strings before any rule runs, keeping `null` and missing fields as absent
//! so required checks can tell "missing" from "empty".

use serde_json::Value;
use shared::{FieldInput, FormSubmission, SanitizedForm};

/// How a field is narrowed during sanitization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    /// Any value collapses to one trimmed string.
    Text,
    /// Arrays stay lists; everything else collapses to one string.
    List,
}

/// Trim leading and trailing whitespace from a string
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Natural string form of a value. Objects have no single-line form and
/// become empty; array elements are joined with commas.
fn natural_string(value: &Value) -> String {
    match value {
        Value::Null | Value::Object(_) => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(natural_string).collect::<Vec<_>>().join(","),
    }
}

/// Sanitize one raw value into a trimmed string.
///
/// `None` and `null` pass through as `None`. This never fails.
pub fn sanitize_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(trim(&natural_string(v))),
    }
}

/// Sanitize an array value element by element, dropping `null` entries.
/// Returns `None` when the value is not an array.
pub fn sanitize_list(value: Option<&Value>) -> Option<Vec<String>> {
    match value {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| sanitize_value(Some(item)))
                .collect(),
        ),
        _ => None,
    }
}

/// Sanitize a single field according to its shape.
pub fn sanitize_field(value: Option<&Value>, shape: InputShape) -> FieldInput {
    if shape == InputShape::List {
        if let Some(items) = sanitize_list(value) {
            return FieldInput::List(items);
        }
    }
    match sanitize_value(value) {
        Some(text) => FieldInput::Text(text),
        None => FieldInput::Absent,
    }
}

/// Sanitize the declared fields of a submission, in declaration order.
/// Undeclared fields in the body are dropped.
pub fn sanitize_submission<'a, I>(submission: &FormSubmission, fields: I) -> SanitizedForm
where
    I: IntoIterator<Item = (&'a str, InputShape)>,
{
    let mut form = SanitizedForm::new();
    for (name, shape) in fields {
        form.insert(name, sanitize_field(submission.get(name), shape));
    }
    form
}
