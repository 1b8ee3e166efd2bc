//! Source records and destination payloads.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// One entity as returned by the source API, an opaque key-value bag.
///
/// Created by a page fetch, consumed once by the pipeline, discarded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Field values keyed by source api name.
    #[serde(flatten)]
    pub fields: HashMap<String, FieldValue>,
}

impl SourceRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Get a field as a non-empty string.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .and_then(FieldValue::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Get a structured sub-object field.
    #[must_use]
    pub fn get_object(&self, field: &str) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.fields.get(field).and_then(FieldValue::as_object)
    }

    /// Set a field value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// The source-internal record identifier, when present.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        self.get_str("id")
    }
}

/// The properties object submitted to the destination system.
///
/// Built fresh per [`SourceRecord`]. Destination properties are flat
/// strings; the map is ordered so request bodies are stable in logs and
/// tests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestinationPayload {
    /// Destination property name to wire value.
    pub properties: BTreeMap<String, String>,
}

impl DestinationPayload {
    /// Create an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, overwriting any prior value for the same key.
    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(property.into(), value.into());
    }

    /// Get a property value.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// Whether any properties have been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Number of properties set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }
}
