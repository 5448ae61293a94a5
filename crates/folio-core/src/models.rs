//! Project records and the raw payload shapes the data sources return.

use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// A single firmware build offered on a project's detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareVersion {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Path or URL of the flashable binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin: Option<String>,
}

/// A link shown in the accessory section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accessory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Structured per-section content of a project.
///
/// Section bodies are HTML fragments authored alongside the project data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiring: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiring_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accessories: Vec<Accessory>,
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// A portfolio project as listed on the home page and shown on its detail page.
///
/// `id` is the lookup key for the detail page. Every other field is lenient so that
/// sparse records coming from the document store still decode.
///
/// # Examples
///
/// ```
/// use folio_core::models::ProjectRecord;
///
/// let json = r#"{"id": "p1", "title": "Weather Station", "year": 2024, "tags": ["esp32"]}"#;
/// let record: ProjectRecord = serde_json::from_str(json).unwrap();
/// assert_eq!(record.id, "p1");
/// assert_eq!(record.year.as_deref(), Some("2024"));
/// assert!(record.summary.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ProjectContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_versions: Option<Vec<FirmwareVersion>>,
    /// Fields not modelled above, e.g. `value` for scalar map entries.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

impl ProjectRecord {
    pub fn is_highlight(&self) -> bool {
        self.highlight.unwrap_or(false)
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Year {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Year>::deserialize(deserializer)?.map(|year| match year {
        Year::Text(s) => s,
        Year::Number(n) => n.to_string(),
    }))
}

/// The undecoded body returned by any data source.
///
/// Sources answer with either a JSON array of project objects or a keyed map of
/// `id -> fields` (the document-store tree shape). `null` means the path is empty.
/// Anything else is rejected at decode time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPayload {
    List(Vec<Value>),
    Keyed(Map<String, Value>),
    Empty(()),
}

impl RawPayload {
    /// Decodes a response body, mapping wrong shapes to [`AppError::ShapeError`].
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        let value: Value = serde_json::from_slice(body)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, AppError> {
        match value {
            Value::Null => Ok(RawPayload::Empty(())),
            Value::Array(items) => Ok(RawPayload::List(items)),
            Value::Object(map) => Ok(RawPayload::Keyed(map)),
            other => Err(AppError::ShapeError(format!(
                "expected an array or object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Normalizes and decodes the payload into typed records.
    pub fn into_records(self) -> Result<Vec<ProjectRecord>, AppError> {
        decode_records(normalize_to_array(self))
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Flattens a payload into an ordered list of record objects.
///
/// Arrays pass through untouched. Keyed maps yield one entry per key in document
/// order: object values gain an `id` equal to the key unless they already carry
/// one, scalar values become `{"id": key, "value": scalar}`.
///
/// # Examples
///
/// ```
/// use folio_core::models::{normalize_to_array, RawPayload};
/// use serde_json::json;
///
/// let raw = RawPayload::from_value(json!({"p1": {"title": "T"}, "p2": 7})).unwrap();
/// let items = normalize_to_array(raw);
/// assert_eq!(items, vec![json!({"title": "T", "id": "p1"}), json!({"id": "p2", "value": 7})]);
/// ```
pub fn normalize_to_array(raw: RawPayload) -> Vec<Value> {
    match raw {
        RawPayload::List(items) => items,
        RawPayload::Keyed(map) => map
            .into_iter()
            .map(|(key, value)| match value {
                Value::Object(mut fields) => {
                    fields.entry("id").or_insert(Value::String(key));
                    Value::Object(fields)
                }
                scalar => {
                    let mut fields = Map::new();
                    fields.insert("id".to_string(), Value::String(key));
                    fields.insert("value".to_string(), scalar);
                    Value::Object(fields)
                }
            })
            .collect(),
        RawPayload::Empty(()) => Vec::new(),
    }
}

/// Decodes normalized entries into [`ProjectRecord`]s, reporting the first bad index.
pub fn decode_records(items: Vec<Value>) -> Result<Vec<ProjectRecord>, AppError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item)
                .map_err(|e| AppError::ShapeError(format!("record {}: {}", index, e)))
        })
        .collect()
}
