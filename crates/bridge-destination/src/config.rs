//! Destination client configuration.

/// Configuration for the destination CRM client.
#[derive(Debug, Clone)]
pub struct DestinationConfig {
    /// Base URL of the destination API, e.g. `https://api.crm.example.com`.
    pub api_base_url: String,

    /// Long-lived bearer token.
    pub access_token: String,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,
}

impl DestinationConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let api_base_url = reader("DESTINATION_API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("DESTINATION_API_BASE_URL".into()))?;

        let access_token = reader("DESTINATION_ACCESS_TOKEN")
            .map_err(|_| ConfigError::MissingVar("DESTINATION_ACCESS_TOKEN".into()))?;

        let request_timeout_secs = reader("DESTINATION_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        Ok(Self {
            api_base_url,
            access_token,
            request_timeout_secs,
        })
    }

    /// The objects endpoint URL for a destination object type.
    #[must_use]
    pub fn objects_url(&self, object: &str) -> String {
        format!(
            "{}/crm/v3/objects/{object}",
            self.api_base_url.trim_end_matches('/')
        )
    }

    /// The property catalog endpoint URL for an object type.
    #[must_use]
    pub fn properties_url(&self, object: &str) -> String {
        format!(
            "{}/crm/v3/properties/{object}",
            self.api_base_url.trim_end_matches('/')
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env::VarError;

    fn make_reader(vars: HashMap<&str, &str>) -> impl Fn(&str) -> Result<String, VarError> {
        let owned: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| owned.get(key).cloned().ok_or(VarError::NotPresent)
    }

    #[test]
    fn test_from_reader() {
        let config = DestinationConfig::from_reader(make_reader(HashMap::from([
            ("DESTINATION_API_BASE_URL", "https://api.example.com/"),
            ("DESTINATION_ACCESS_TOKEN", "pat-123"),
        ])))
        .unwrap();

        assert_eq!(
            config.objects_url("contacts"),
            "https://api.example.com/crm/v3/objects/contacts"
        );
        assert_eq!(
            config.properties_url("deals"),
            "https://api.example.com/crm/v3/properties/deals"
        );
    }

    #[test]
    fn test_missing_token_is_reported() {
        let err = DestinationConfig::from_reader(make_reader(HashMap::from([(
            "DESTINATION_API_BASE_URL",
            "https://api.example.com",
        )])))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DESTINATION_ACCESS_TOKEN"));
    }
}
