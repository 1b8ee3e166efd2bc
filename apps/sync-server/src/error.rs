//! API error type and HTTP status mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use bridge_sync::SyncError;

/// Error type for trigger endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The run could not refresh or use the source access token.
    #[error("token refresh required: {0}")]
    TokenRefreshRequired(String),

    /// A rate limit rejected the run before any records were processed.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Anything else that killed the run.
    #[error("sync failed: {0}")]
    Internal(String),
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        if err.is_token_failure() {
            ApiError::TokenRefreshRequired(err.to_string())
        } else if err.is_rate_limit() {
            ApiError::RateLimited(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            ApiError::TokenRefreshRequired(_) => (
                StatusCode::UNAUTHORIZED,
                "token_refresh_required",
                self.to_string(),
            ),
            ApiError::RateLimited(_) => {
                (StatusCode::TOO_MANY_REQUESTS, "rate_limited", self.to_string())
            }
            ApiError::Internal(ref e) => {
                error!("sync run failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    self.to_string(),
                )
            }
        };

        let body = json!({
            "error": error_type,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for trigger endpoints.
pub type Result<T> = std::result::Result<T, ApiError>;
