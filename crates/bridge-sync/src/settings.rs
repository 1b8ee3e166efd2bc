//! Engine settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// Tunable behavior of the sync engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Pagination stops before the next page when the source's remaining
    /// quota is at or below this floor.
    #[serde(default = "default_quota_floor")]
    pub quota_floor: u32,

    /// Where per-record failures are appended, one JSON object per line.
    #[serde(default = "default_error_log_path")]
    pub error_log_path: PathBuf,
}

fn default_quota_floor() -> u32 {
    1
}

fn default_error_log_path() -> PathBuf {
    PathBuf::from("sync-errors.jsonl")
}

impl SyncSettings {
    /// Check value ranges.
    pub fn validate(&self) -> SyncResult<()> {
        if self.quota_floor > 1000 {
            return Err(SyncError::configuration(
                "quota floor above 1000 would stop every run immediately",
            ));
        }
        Ok(())
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            quota_floor: default_quota_floor(),
            error_log_path: default_error_log_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SyncSettings::default();
        assert_eq!(settings.quota_floor, 1);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_absurd_floor() {
        let settings = SyncSettings {
            quota_floor: 5000,
            ..SyncSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_deserializes_with_defaults() {
        let settings: SyncSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.quota_floor, 1);
        assert_eq!(
            settings.error_log_path,
            PathBuf::from("sync-errors.jsonl")
        );
    }
}
