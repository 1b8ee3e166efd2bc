//! Schema field mapping.
//!
//! Builds a one-time map from source field api names to destination
//! property names for a record type by joining the two schema catalogs on
//! normalized labels. Exact label matches win; a static override table
//! catches labels that drifted apart between the systems; everything else
//! is reported as unmatched so operators can extend the overrides.
//! Unmatched fields never fail the run.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use bridge_core::FieldDescriptor;

/// Normalize a human-facing field label into a comparison key.
///
/// Lower-cases, replaces each whitespace run with an underscore, and strips
/// every remaining character outside `[a-z0-9_]`.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// A source field that matched neither the destination catalog nor the
/// override table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmatchedField {
    /// Source api name.
    pub api_name: String,
    /// Normalized label that failed to match.
    pub label: String,
}

/// Immutable source-to-destination field map for one record type.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: HashMap<String, String>,
    unmatched: Vec<UnmatchedField>,
}

impl FieldMap {
    /// The destination property a source field maps to.
    #[must_use]
    pub fn get(&self, source_field: &str) -> Option<&str> {
        self.entries.get(source_field).map(String::as_str)
    }

    /// Iterate over (source field, destination property) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Source fields that matched neither rule.
    #[must_use]
    pub fn unmatched(&self) -> &[UnmatchedField] {
        &self.unmatched
    }

    /// Build a map directly from pairs. Test and tooling convenience.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            unmatched: Vec::new(),
        }
    }
}

/// Builds [`FieldMap`]s from schema catalogs.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    /// Normalized source label to destination property name.
    overrides: HashMap<String, String>,
    /// Destination property names removed from the catalog before matching.
    exclusions: HashSet<String>,
}

impl FieldMapper {
    /// Create a mapper with explicit overrides and exclusions.
    #[must_use]
    pub fn new(overrides: HashMap<String, String>, exclusions: HashSet<String>) -> Self {
        Self {
            overrides,
            exclusions,
        }
    }

    /// Build the field map for one record type's catalogs.
    ///
    /// Exact normalized-label matches take precedence over the override
    /// table. Destination properties in the exclusion set never match,
    /// which keeps system-owned properties from being silently overwritten.
    #[must_use]
    pub fn build(
        &self,
        source_fields: &[FieldDescriptor],
        destination_properties: &[FieldDescriptor],
    ) -> FieldMap {
        let mut destination_by_label: HashMap<String, &str> = HashMap::new();
        for property in destination_properties {
            if self.exclusions.contains(property.api_name.as_str()) {
                debug!(property = %property.api_name, "excluding system-owned destination property");
                continue;
            }
            destination_by_label
                .entry(normalize_label(&property.label))
                .or_insert(property.api_name.as_str());
        }

        let mut entries = HashMap::new();
        let mut unmatched = Vec::new();

        for field in source_fields {
            let label = normalize_label(&field.label);
            if let Some(destination) = destination_by_label.get(label.as_str()) {
                entries.insert(field.api_name.clone(), (*destination).to_string());
            } else if let Some(destination) = self.overrides.get(label.as_str()) {
                debug!(source = %field.api_name, destination = %destination, "override mapping");
                entries.insert(field.api_name.clone(), destination.clone());
            } else {
                unmatched.push(UnmatchedField {
                    api_name: field.api_name.clone(),
                    label,
                });
            }
        }

        unmatched.sort_by(|a, b| a.api_name.cmp(&b.api_name));
        FieldMap { entries, unmatched }
    }
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new(default_overrides(), default_exclusions())
    }
}

/// Static override table: normalized source label to destination property.
///
/// Catches labels that evolved apart between the two schemas. Extended by
/// operators as unmatched fields are reported.
#[must_use]
pub fn default_overrides() -> HashMap<String, String> {
    [
        ("company", "company"),
        ("title", "title"),
        ("website", "website"),
        ("employees", "employees"),
        ("no_of_employee", "no_of_employee"),
        ("state", "state"),
        ("notes_", "notes"),
        ("organization_type", "industry"),
        ("currentcompanyurl", "currentcompanyurl"),
        ("ads_platform", "ad_source"),
        ("phone__company_hq", "phone_2"),
        ("first_visit", "first_visited_time"),
        ("most_recent_visit", "last_visited_time"),
        ("first_page_visited", "first_visited_url"),
        ("linkedin_connection", "linkedin_connected"),
        ("suffix", "salutation"),
        ("bdr_owner", "zoho_bdr_id"),
        ("lead_owner", "lead_owner"),
        ("email", "email"),
        ("account_name", "account_name"),
        ("fax", "fax"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// System-owned destination properties removed from the catalog before
/// matching.
#[must_use]
pub fn default_exclusions() -> HashSet<String> {
    [
        "hubspot_owner_id",
        "stage",
        "Created_Time",
        "Modified_Time",
        "bdr_owner",
        "hs_lead_status",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(api_name: &str, label: &str) -> FieldDescriptor {
        FieldDescriptor::new(api_name, label)
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Lead Status"), "lead_status");
        assert_eq!(normalize_label("E-mail"), "email");
        assert_eq!(normalize_label("  First   Name "), "first_name");
        assert_eq!(normalize_label("Phone (Company HQ)"), "phone_company_hq");
        assert_eq!(normalize_label("already_normal"), "already_normal");
    }

    #[test]
    fn test_exact_match_maps() {
        let mapper = FieldMapper::new(HashMap::new(), HashSet::new());
        let map = mapper.build(
            &[descriptor("Lead_Status", "Lead Status")],
            &[descriptor("lead_contact_status", "Lead Status")],
        );
        assert_eq!(map.get("Lead_Status"), Some("lead_contact_status"));
        assert!(map.unmatched().is_empty());
    }

    #[test]
    fn test_exact_match_beats_override() {
        let overrides = HashMap::from([("lead_status".to_string(), "other_property".to_string())]);
        let mapper = FieldMapper::new(overrides, HashSet::new());
        let map = mapper.build(
            &[descriptor("Lead_Status", "Lead Status")],
            &[descriptor("lead_contact_status", "Lead Status")],
        );
        assert_eq!(map.get("Lead_Status"), Some("lead_contact_status"));
    }

    #[test]
    fn test_override_applies_when_no_exact_match() {
        let mapper = FieldMapper::default();
        let map = mapper.build(
            &[descriptor("Organization_Type", "Organization Type")],
            &[descriptor("industry", "Industry")],
        );
        assert_eq!(map.get("Organization_Type"), Some("industry"));
    }

    #[test]
    fn test_excluded_destination_property_never_matches() {
        let mapper = FieldMapper::default();
        let map = mapper.build(
            &[descriptor("Owner_Id", "Hubspot Owner Id")],
            &[descriptor("hubspot_owner_id", "Hubspot Owner Id")],
        );
        assert_eq!(map.get("Owner_Id"), None);
        assert_eq!(map.unmatched().len(), 1);
    }

    #[test]
    fn test_unmatched_fields_are_reported_sorted() {
        let mapper = FieldMapper::new(HashMap::new(), HashSet::new());
        let map = mapper.build(
            &[
                descriptor("Zeta_Field", "Zeta Field"),
                descriptor("Alpha_Field", "Alpha Field"),
            ],
            &[],
        );
        assert!(map.is_empty());
        let names: Vec<&str> = map.unmatched().iter().map(|u| u.api_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha_Field", "Zeta_Field"]);
        assert_eq!(map.unmatched()[0].label, "alpha_field");
    }

    #[test]
    fn test_first_destination_label_wins_on_duplicates() {
        let mapper = FieldMapper::new(HashMap::new(), HashSet::new());
        let map = mapper.build(
            &[descriptor("Phone", "Phone")],
            &[
                descriptor("phone", "Phone"),
                descriptor("phone_backup", "Phone"),
            ],
        );
        assert_eq!(map.get("Phone"), Some("phone"));
    }
}
