//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use bridge_sync::SyncSettings;

/// Configuration for the trigger server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for the HTTP server.
    pub listen_addr: SocketAddr,

    /// Engine settings assembled from the environment.
    pub sync: SyncSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let listen_addr = reader("SYNC_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("SYNC_LISTEN_ADDR".into(), e.to_string()))?;

        let quota_floor = reader("SYNC_QUOTA_FLOOR")
            .unwrap_or_else(|_| "1".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("SYNC_QUOTA_FLOOR".into(), e.to_string()))?;

        let error_log_path = reader("SYNC_ERROR_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("sync-errors.jsonl"));

        Ok(Self {
            listen_addr,
            sync: SyncSettings {
                quota_floor,
                error_log_path,
            },
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
