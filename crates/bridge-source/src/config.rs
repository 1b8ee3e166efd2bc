//! Source client configuration.

/// Configuration for the source CRM client.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the source data API, e.g. `https://crm.example.com`.
    pub api_base_url: String,

    /// Base URL of the accounts server hosting the token endpoint.
    pub accounts_base_url: String,

    /// OAuth client identifier.
    pub client_id: String,

    /// OAuth client secret.
    pub client_secret: String,

    /// Long-lived refresh token exchanged for access tokens.
    pub refresh_token: String,

    /// Records requested per page. Default: 200.
    pub page_size: u32,

    /// Per-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,
}

impl SourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// Allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let api_base_url = reader("SOURCE_API_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("SOURCE_API_BASE_URL".into()))?;

        let accounts_base_url = reader("SOURCE_ACCOUNTS_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("SOURCE_ACCOUNTS_BASE_URL".into()))?;

        let client_id = reader("SOURCE_CLIENT_ID")
            .map_err(|_| ConfigError::MissingVar("SOURCE_CLIENT_ID".into()))?;

        let client_secret = reader("SOURCE_CLIENT_SECRET")
            .map_err(|_| ConfigError::MissingVar("SOURCE_CLIENT_SECRET".into()))?;

        let refresh_token = reader("SOURCE_REFRESH_TOKEN")
            .map_err(|_| ConfigError::MissingVar("SOURCE_REFRESH_TOKEN".into()))?;

        let page_size = reader("SOURCE_PAGE_SIZE")
            .unwrap_or_else(|_| "200".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("SOURCE_PAGE_SIZE".into(), e.to_string()))?;

        let request_timeout_secs = reader("SOURCE_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .unwrap_or(30);

        let config = Self {
            api_base_url,
            accounts_base_url,
            client_id,
            client_secret,
            refresh_token,
            page_size,
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < 1 || self.page_size > 200 {
            return Err(ConfigError::InvalidValue(
                "SOURCE_PAGE_SIZE".into(),
                "must be between 1 and 200".into(),
            ));
        }
        Ok(())
    }

    /// The token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/oauth/v2/token",
            self.accounts_base_url.trim_end_matches('/')
        )
    }

    /// The list endpoint URL for a module.
    #[must_use]
    pub fn list_url(&self, module: &str) -> String {
        format!("{}/crm/v2/{module}", self.api_base_url.trim_end_matches('/'))
    }

    /// The field catalog endpoint URL.
    #[must_use]
    pub fn fields_url(&self) -> String {
        format!(
            "{}/crm/v2/settings/fields",
            self.api_base_url.trim_end_matches('/')
        )
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
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

    fn full_vars() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SOURCE_API_BASE_URL", "https://crm.example.com"),
            ("SOURCE_ACCOUNTS_BASE_URL", "https://accounts.example.com/"),
            ("SOURCE_CLIENT_ID", "cid"),
            ("SOURCE_CLIENT_SECRET", "secret"),
            ("SOURCE_REFRESH_TOKEN", "rt"),
        ])
    }

    #[test]
    fn test_from_reader_defaults() {
        let config = SourceConfig::from_reader(make_reader(full_vars())).unwrap();
        assert_eq!(config.page_size, 200);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_missing_var_is_reported() {
        let mut vars = full_vars();
        vars.remove("SOURCE_CLIENT_SECRET");
        let err = SourceConfig::from_reader(make_reader(vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "SOURCE_CLIENT_SECRET"));
    }

    #[test]
    fn test_page_size_bounds() {
        let mut vars = full_vars();
        vars.insert("SOURCE_PAGE_SIZE", "500");
        assert!(SourceConfig::from_reader(make_reader(vars)).is_err());
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let config = SourceConfig::from_reader(make_reader(full_vars())).unwrap();
        assert_eq!(
            config.token_url(),
            "https://accounts.example.com/oauth/v2/token"
        );
        assert_eq!(
            config.list_url("Contacts"),
            "https://crm.example.com/crm/v2/Contacts"
        );
    }
}
