use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Session keys holding original snapshots contain this marker.
pub const ORIGINAL_MARKER: &str = "Original";

/// Session key under which the original snapshot of `entity` is stored,
/// e.g. `personOriginal`.
pub fn original_namespace(entity: &str) -> String {
    format!("{entity}{ORIGINAL_MARKER}")
}

// ═══════════════════════════════════════════════════════════════════════════
// SUBMISSIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Raw, untyped form body as received from the client.
///
/// Field order follows the order of the incoming body. A body that is not a
/// JSON object produces an empty submission, so every field reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSubmission(Map<String, Value>);

impl FormSubmission {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single field after sanitization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Absent,
    Text(String),
    List(Vec<String>),
}

impl FieldInput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldInput::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldInput::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// True when the field is missing or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldInput::Absent => true,
            FieldInput::Text(s) => s.is_empty(),
            FieldInput::List(_) => false,
        }
    }

    /// Flattened string form used for original snapshots.
    pub fn to_snapshot_string(&self) -> Option<String> {
        match self {
            FieldInput::Absent => None,
            FieldInput::Text(s) => Some(s.clone()),
            FieldInput::List(items) => Some(items.join(",")),
        }
    }
}

impl Serialize for FieldInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldInput::Absent => serializer.serialize_none(),
            FieldInput::Text(s) => serializer.serialize_str(s),
            FieldInput::List(items) => items.serialize(serializer),
        }
    }
}

/// Sanitized form values, in submission order.
///
/// Serializes as a JSON object so the rendering layer can re-populate inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedForm {
    fields: Vec<(String, FieldInput)>,
}

impl SanitizedForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping its first position.
    pub fn insert(&mut self, field: impl Into<String>, input: FieldInput) {
        let field = field.into();
        match self.fields.iter_mut().find(|(name, _)| *name == field) {
            Some((_, existing)) => *existing = input,
            None => self.fields.push((field, input)),
        }
    }

    /// Missing fields read as [`FieldInput::Absent`].
    pub fn get(&self, field: &str) -> &FieldInput {
        static ABSENT: FieldInput = FieldInput::Absent;
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, input)| input)
            .unwrap_or(&ABSENT)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).as_text()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldInput)> {
        self.fields.iter().map(|(name, input)| (name.as_str(), input))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for SanitizedForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, input) in &self.fields {
            map.serialize_entry(name, input)?;
        }
        map.end()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ORIGINAL SNAPSHOTS
// ═══════════════════════════════════════════════════════════════════════════

/// Field values as they were when the form was first displayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginalSnapshot(BTreeMap<String, String>);

impl OriginalSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_form(form: &SanitizedForm) -> Self {
        let values = form
            .iter()
            .filter_map(|(name, input)| input.to_snapshot_string().map(|v| (name.to_string(), v)))
            .collect();
        Self(values)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// ERROR REPORTS
// ═══════════════════════════════════════════════════════════════════════════

/// One entry of a GOV.UK error summary banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub text: String,
    pub href: String,
}

/// Errors ready for the rendering layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub field_errors: BTreeMap<String, String>,
    pub summary_list: Vec<SummaryItem>,
}

impl ErrorReport {
    pub fn is_empty(&self) -> bool {
        self.summary_list.is_empty()
    }
}

/// Response body for form endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct FormResponse {
    pub form: String,
    pub values: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorReport>,
}
