//! Record types and business-key definitions.

use serde::{Deserialize, Serialize};

/// The kinds of business record the bridge synchronizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// People already qualified into the pipeline.
    Contact,
    /// Unqualified people.
    Lead,
    /// Sales opportunities.
    Deal,
    /// Companies.
    Account,
}

impl RecordType {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Contact => "contact",
            RecordType::Lead => "lead",
            RecordType::Deal => "deal",
            RecordType::Account => "account",
        }
    }

    /// The source API module name for list and catalog calls.
    #[must_use]
    pub fn source_module(&self) -> &'static str {
        match self {
            RecordType::Contact => "Contacts",
            RecordType::Lead => "Leads",
            RecordType::Deal => "Deals",
            RecordType::Account => "Accounts",
        }
    }

    /// The destination API object type for search, create and update.
    ///
    /// Contacts and leads land in the same destination object; leads are
    /// distinguished there by a status property, not a separate type.
    #[must_use]
    pub fn destination_object(&self) -> &'static str {
        match self {
            RecordType::Contact | RecordType::Lead => "contacts",
            RecordType::Deal => "deals",
            RecordType::Account => "companies",
        }
    }

    /// The business key used to match records across systems.
    #[must_use]
    pub fn business_key(&self) -> BusinessKey {
        match self {
            RecordType::Contact | RecordType::Lead => BusinessKey {
                source_field: "Email",
                destination_property: "email",
                matching: KeyMatch::Equals,
            },
            RecordType::Deal => BusinessKey {
                source_field: "Deal_Name",
                destination_property: "dealname",
                matching: KeyMatch::Equals,
            },
            RecordType::Account => BusinessKey {
                source_field: "Account_Name",
                destination_property: "account_name",
                matching: KeyMatch::ContainsToken,
            },
        }
    }

    /// All synchronized record types.
    #[must_use]
    pub fn all() -> [RecordType; 4] {
        [
            RecordType::Contact,
            RecordType::Lead,
            RecordType::Deal,
            RecordType::Account,
        ]
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "contact" | "contacts" => Ok(RecordType::Contact),
            "lead" | "leads" => Ok(RecordType::Lead),
            "deal" | "deals" => Ok(RecordType::Deal),
            "account" | "accounts" | "company" | "companies" => Ok(RecordType::Account),
            _ => Err(format!("Unknown record type: {s}")),
        }
    }
}

/// How a business key is matched against the destination search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyMatch {
    /// Exact equality on the key property.
    Equals,
    /// Token-level containment, for free-text name properties.
    ContainsToken,
}

impl KeyMatch {
    /// The destination search operator name.
    #[must_use]
    pub fn operator(&self) -> &'static str {
        match self {
            KeyMatch::Equals => "EQ",
            KeyMatch::ContainsToken => "CONTAINS_TOKEN",
        }
    }
}

/// The natural identifying field used to reconcile a record across systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessKey {
    /// Field name on the source record.
    pub source_field: &'static str,
    /// Property name on the destination object.
    pub destination_property: &'static str,
    /// Search operator used for resolution.
    pub matching: KeyMatch,
}
