//! Error types shared by the CRM clients.

use thiserror::Error;

/// Error raised by a CRM client operation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Failed to reach the remote system.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Description of the failure.
        message: String,
        /// Underlying transport error, when available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The request timed out.
    #[error("request timed out after {seconds}s")]
    Timeout {
        /// Configured timeout that elapsed.
        seconds: u64,
    },

    /// The remote system rejected the credentials.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The access token was rejected as expired or invalid.
    #[error("access token expired or invalid")]
    TokenExpired,

    /// The remote system is rate limiting.
    #[error("rate limited by remote system")]
    RateLimited {
        /// Seconds to wait before retrying, when the server said so.
        retry_after_secs: Option<u64>,
    },

    /// The requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The remote system returned a non-success status.
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// Failed to serialize or deserialize a payload.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client was configured incorrectly.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl ClientError {
    /// Create a connection failure from a message.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        ClientError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failure wrapping a transport error.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ClientError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication failure.
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        ClientError::AuthenticationFailed(message.into())
    }

    /// Create an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        ClientError::InvalidResponse(message.into())
    }

    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ClientError::InvalidConfiguration(message.into())
    }

    /// Whether retrying the same call later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed { .. }
                | ClientError::Timeout { .. }
                | ClientError::RateLimited { .. }
        )
    }

    /// Whether this failure means the access token must be refreshed.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        matches!(self, ClientError::TokenExpired)
    }

    /// Whether this failure is the remote system's rate limiter.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::RateLimited { .. })
    }

    /// Short machine-readable code for logs and the error sink.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::ConnectionFailed { .. } => "connection_failed",
            ClientError::Timeout { .. } => "timeout",
            ClientError::AuthenticationFailed(_) => "authentication_failed",
            ClientError::TokenExpired => "token_expired",
            ClientError::RateLimited { .. } => "rate_limited",
            ClientError::NotFound(_) => "not_found",
            ClientError::InvalidResponse(_) => "invalid_response",
            ClientError::Api { .. } => "api_error",
            ClientError::Serialization(_) => "serialization_error",
            ClientError::InvalidConfiguration(_) => "invalid_configuration",
        }
    }
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::connection_failed("refused").is_transient());
        assert!(ClientError::Timeout { seconds: 30 }.is_transient());
        assert!(ClientError::RateLimited {
            retry_after_secs: Some(10)
        }
        .is_transient());
        assert!(!ClientError::TokenExpired.is_transient());
        assert!(!ClientError::authentication_failed("bad secret").is_transient());
    }

    #[test]
    fn test_token_expiry_classification() {
        assert!(ClientError::TokenExpired.is_token_expired());
        assert!(!ClientError::authentication_failed("nope").is_token_expired());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ClientError::RateLimited {
                retry_after_secs: None
            }
            .error_code(),
            "rate_limited"
        );
        assert_eq!(ClientError::TokenExpired.error_code(), "token_expired");
    }
}
