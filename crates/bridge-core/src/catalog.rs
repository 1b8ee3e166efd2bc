//! Field and property catalog descriptors.

use serde::{Deserialize, Serialize};

/// One field from a system's schema catalog.
///
/// Both systems describe their schemas as a list of fields with a stable
/// api name and a human-facing label; the field mapper joins the two
/// catalogs on normalized labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Stable identifier used in API payloads.
    pub api_name: String,
    /// Human-facing display label.
    pub label: String,
}

impl FieldDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(api_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            label: label.into(),
        }
    }
}
