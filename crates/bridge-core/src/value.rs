//! Tagged field values.
//!
//! Source records arrive as arbitrary JSON; every field is classified into
//! an explicit kind (scalar, multi-value list, structured sub-object) so
//! the transformer dispatches on declared shape instead of inspecting raw
//! JSON at each use site.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The shape class of a field value, driving transformer dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Absent or JSON null.
    Empty,
    /// A single string, number, or boolean.
    Scalar,
    /// A list of values (multi-select fields).
    MultiValue,
    /// A nested object (owner, parent-account linkage, audit stamps).
    Structured,
}

/// A single field value from a source record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Null value.
    Null,
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// List of values.
    List(Vec<FieldValue>),
    /// Structured sub-object.
    Object(serde_json::Map<String, JsonValue>),
}

impl FieldValue {
    /// Classify this value for transformer dispatch.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Null => FieldKind::Empty,
            FieldValue::Boolean(_) | FieldValue::Integer(_) | FieldValue::Float(_) => {
                FieldKind::Scalar
            }
            FieldValue::String(s) if s.is_empty() => FieldKind::Empty,
            FieldValue::String(_) => FieldKind::Scalar,
            FieldValue::List(_) => FieldKind::MultiValue,
            FieldValue::Object(_) => FieldKind::Structured,
        }
    }

    /// Check if the value is null or an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind() == FieldKind::Empty
    }

    /// Get as string reference, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get as list slice, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as structured object, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&serde_json::Map<String, JsonValue>> {
        match self {
            FieldValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Render a scalar value as the destination wire string.
    ///
    /// Returns `None` for empty values and for lists/objects, which have
    /// their own transformation paths.
    #[must_use]
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Float(f) => Some(f.to_string()),
            FieldValue::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => FieldValue::Null,
            JsonValue::Bool(b) => FieldValue::Boolean(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Integer(i)
                } else {
                    FieldValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            JsonValue::String(s) => FieldValue::String(s),
            JsonValue::Array(items) => {
                FieldValue::List(items.into_iter().map(FieldValue::from).collect())
            }
            JsonValue::Object(map) => FieldValue::Object(map),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_classification() {
        assert_eq!(FieldValue::Null.kind(), FieldKind::Empty);
        assert_eq!(FieldValue::from("").kind(), FieldKind::Empty);
        assert_eq!(FieldValue::from("x").kind(), FieldKind::Scalar);
        assert_eq!(FieldValue::from(42i64).kind(), FieldKind::Scalar);
        assert_eq!(FieldValue::from(true).kind(), FieldKind::Scalar);
        assert_eq!(
            FieldValue::List(vec![FieldValue::from("a")]).kind(),
            FieldKind::MultiValue
        );
        assert_eq!(
            FieldValue::from(json!({"id": "1"})).kind(),
            FieldKind::Structured
        );
    }

    #[test]
    fn test_from_json_value() {
        let value = FieldValue::from(json!(["a", "b"]));
        let list = value.as_list().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].as_str(), Some("a"));
    }

    #[test]
    fn test_scalar_string_rendering() {
        assert_eq!(
            FieldValue::from("hello").to_scalar_string(),
            Some("hello".to_string())
        );
        assert_eq!(
            FieldValue::from(7i64).to_scalar_string(),
            Some("7".to_string())
        );
        assert_eq!(
            FieldValue::from(true).to_scalar_string(),
            Some("true".to_string())
        );
        assert_eq!(FieldValue::Null.to_scalar_string(), None);
        assert_eq!(FieldValue::from("").to_scalar_string(), None);
    }

    #[test]
    fn test_untagged_deserialization() {
        let value: FieldValue = serde_json::from_str("\"Qualified\"").unwrap();
        assert_eq!(value.as_str(), Some("Qualified"));

        let value: FieldValue = serde_json::from_str("null").unwrap();
        assert!(value.is_empty());
    }
}
