//! Firestore document model.
//!
//! The Firestore REST API represents every field as a single-key object
//! naming its type (`{"stringValue": "x"}`, `{"integerValue": "42"}`, ...).
//! This module models that wire shape plus the typed accessors the
//! [`convert`] layer uses to validate and coerce loose documents into the
//! record types in [`crate::records`]. No I/O lives here; the HTTP clients
//! in the binaries handle transport.

pub mod convert;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A typed Firestore field value, as the REST API encodes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    StringValue(String),
    /// int64 values travel as strings on the wire.
    IntegerValue(String),
    DoubleValue(f64),
    BooleanValue(bool),
    TimestampValue(DateTime<Utc>),
    NullValue(Option<()>),
    MapValue(MapValue),
    ArrayValue(ArrayValue),
}

/// Nested map of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapValue {
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

/// Array of values; the API omits `values` entirely for empty arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
}

impl Value {
    /// Convenience constructor for an integer field.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::IntegerValue(value.to_string())
    }

    /// Convenience constructor for a string field.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    /// Convenience constructor for an array of string values.
    #[must_use]
    pub fn string_array<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Self> = values.into_iter().map(|s| Self::string(s)).collect();
        Self::ArrayValue(ArrayValue {
            values: if values.is_empty() { None } else { Some(values) },
        })
    }
}

/// A Firestore document: resource name plus typed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Full resource name, e.g.
    /// `projects/p/databases/(default)/documents/products/abc123`.
    pub name: String,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Document {
    /// The server-assigned document id: the last path segment of `name`.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

/// Errors produced while coercing a document into a record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// A required field is absent.
    #[error("missing field: {0}")]
    MissingField(String),
    /// A field is present with an unexpected value type.
    #[error("field {field} has unexpected type (expected {expected})")]
    WrongType {
        field: String,
        expected: &'static str,
    },
    /// A field decoded but failed domain validation.
    #[error("field {field} is invalid: {message}")]
    Invalid { field: String, message: String },
}

/// Typed accessors over a document's field map.
///
/// Fields written by earlier versions of the dashboard can be missing or
/// mistyped; every accessor reports which field failed rather than panicking.
pub struct Fields<'a>(pub &'a BTreeMap<String, Value>);

impl Fields<'_> {
    fn get(&self, name: &str) -> Option<&Value> {
        match self.0.get(name) {
            Some(Value::NullValue(_)) | None => None,
            Some(other) => Some(other),
        }
    }

    /// Required string field.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not a string.
    pub fn string(&self, name: &str) -> Result<String, ConvertError> {
        self.string_opt(name)?
            .ok_or_else(|| ConvertError::MissingField(name.to_string()))
    }

    /// Optional string field; `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but not a string.
    pub fn string_opt(&self, name: &str) -> Result<Option<String>, ConvertError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::StringValue(s)) => Ok(Some(s.clone())),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "string",
            }),
        }
    }

    /// Required integer field. Tolerates `doubleValue` with an integral
    /// value, which the browser SDK writes for plain JS numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is absent or not numeric.
    #[allow(clippy::cast_possible_truncation)]
    pub fn integer(&self, name: &str) -> Result<i64, ConvertError> {
        match self.get(name) {
            Some(Value::IntegerValue(raw)) => {
                raw.parse().map_err(|_| ConvertError::Invalid {
                    field: name.to_string(),
                    message: format!("not an int64: {raw}"),
                })
            }
            Some(Value::DoubleValue(d)) if d.fract() == 0.0 => Ok(*d as i64),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "integer",
            }),
            None => Err(ConvertError::MissingField(name.to_string())),
        }
    }

    /// Boolean field defaulting to `false` when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but not a boolean.
    pub fn bool_or_false(&self, name: &str) -> Result<bool, ConvertError> {
        match self.get(name) {
            None => Ok(false),
            Some(Value::BooleanValue(b)) => Ok(*b),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "boolean",
            }),
        }
    }

    /// Timestamp field defaulting to the Unix epoch when absent; documents
    /// seeded before timestamps were recorded lack them.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is present but not a timestamp.
    pub fn timestamp_or_epoch(&self, name: &str) -> Result<DateTime<Utc>, ConvertError> {
        match self.get(name) {
            None => Ok(DateTime::UNIX_EPOCH),
            Some(Value::TimestampValue(ts)) => Ok(*ts),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "timestamp",
            }),
        }
    }

    /// String-array field defaulting to empty when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the field (or any element) has the wrong type.
    pub fn string_array(&self, name: &str) -> Result<Vec<String>, ConvertError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::ArrayValue(array)) => array
                .values
                .iter()
                .flatten()
                .map(|v| match v {
                    Value::StringValue(s) => Ok(s.clone()),
                    _ => Err(ConvertError::WrongType {
                        field: name.to_string(),
                        expected: "array of strings",
                    }),
                })
                .collect(),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "array",
            }),
        }
    }

    /// Array of nested maps defaulting to empty when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the field (or any element) has the wrong type.
    pub fn map_array(&self, name: &str) -> Result<Vec<&BTreeMap<String, Value>>, ConvertError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::ArrayValue(array)) => array
                .values
                .iter()
                .flatten()
                .map(|v| match v {
                    Value::MapValue(map) => Ok(&map.fields),
                    _ => Err(ConvertError::WrongType {
                        field: name.to_string(),
                        expected: "array of maps",
                    }),
                })
                .collect(),
            Some(_) => Err(ConvertError::WrongType {
                field: name.to_string(),
                expected: "array",
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_value_wire_shape() {
        let json = serde_json::to_value(Value::string("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"stringValue": "hi"}));

        let json = serde_json::to_value(Value::integer(42)).unwrap();
        assert_eq!(json, serde_json::json!({"integerValue": "42"}));

        let json = serde_json::to_value(Value::BooleanValue(true)).unwrap();
        assert_eq!(json, serde_json::json!({"booleanValue": true}));
    }

    #[test]
    fn test_value_parse_integer_string_encoding() {
        let value: Value = serde_json::from_value(serde_json::json!({"integerValue": "15000"}))
            .unwrap();
        assert_eq!(value, Value::integer(15_000));
    }

    #[test]
    fn test_document_doc_id() {
        let doc = Document {
            name: "projects/p/databases/(default)/documents/products/abc123".to_string(),
            fields: BTreeMap::new(),
            create_time: None,
            update_time: None,
        };
        assert_eq!(doc.doc_id(), "abc123");
    }

    #[test]
    fn test_fields_null_counts_as_absent() {
        let mut map = BTreeMap::new();
        map.insert("notes".to_string(), Value::NullValue(None));
        let fields = Fields(&map);
        assert_eq!(fields.string_opt("notes").unwrap(), None);
        assert!(matches!(
            fields.string("notes"),
            Err(ConvertError::MissingField(_))
        ));
    }

    #[test]
    fn test_fields_integer_accepts_integral_double() {
        let mut map = BTreeMap::new();
        map.insert("price_cents".to_string(), Value::DoubleValue(15000.0));
        assert_eq!(Fields(&map).integer("price_cents").unwrap(), 15_000);

        map.insert("price_cents".to_string(), Value::DoubleValue(19.5));
        assert!(matches!(
            Fields(&map).integer("price_cents"),
            Err(ConvertError::WrongType { .. })
        ));
    }

    #[test]
    fn test_fields_wrong_type_is_reported() {
        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::integer(3));
        let err = Fields(&map).string("name").unwrap_err();
        assert!(matches!(err, ConvertError::WrongType { expected: "string", .. }));
    }

    #[test]
    fn test_empty_string_array_roundtrip() {
        let value = Value::string_array(Vec::<String>::new());
        let json = serde_json::to_value(&value).unwrap();
        // Firestore omits `values` for empty arrays.
        assert_eq!(json, serde_json::json!({"arrayValue": {}}));
        let back: Value = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);
    }
}
