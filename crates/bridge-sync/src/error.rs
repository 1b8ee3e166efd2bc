//! Sync engine error types.

use thiserror::Error;

use bridge_core::ClientError;

/// Errors that can occur during synchronization.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A CRM client call failed.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Invalid engine configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token acquisition or refresh failed.
    #[error("token error: {0}")]
    Token(String),

    /// Field mapping failed.
    #[error("mapping error: {0}")]
    Mapping(String),

    /// Rate limited during a phase where the run cannot continue.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SyncError::Configuration(message.into())
    }

    /// Create a token error.
    pub fn token(message: impl Into<String>) -> Self {
        SyncError::Token(message.into())
    }

    /// Create a mapping error.
    pub fn mapping(message: impl Into<String>) -> Self {
        SyncError::Mapping(message.into())
    }

    /// Create a rate-limited error.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        SyncError::RateLimited(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        SyncError::Internal(message.into())
    }

    /// Check if this error could succeed on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Client(e) => e.is_transient(),
            SyncError::RateLimited(_) => true,
            _ => false,
        }
    }

    /// Whether the run failed because the access token could not be used.
    #[must_use]
    pub fn is_token_failure(&self) -> bool {
        match self {
            SyncError::Token(_) => true,
            SyncError::Client(e) => {
                e.is_token_expired() || matches!(e, ClientError::AuthenticationFailed(_))
            }
            _ => false,
        }
    }

    /// Whether the run failed on a rate-limit rejection.
    #[must_use]
    pub fn is_rate_limit(&self) -> bool {
        match self {
            SyncError::RateLimited(_) => true,
            SyncError::Client(e) => e.is_rate_limited(),
            _ => false,
        }
    }
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
