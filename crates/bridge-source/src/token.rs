//! OAuth session management for the source CRM.
//!
//! The session (access token, expiry, refresh token) lives behind a single
//! async mutex held across the refresh await. Concurrent callers that find
//! the token stale therefore block on the in-flight refresh and observe its
//! result instead of issuing a second token-endpoint call.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use bridge_core::{ClientError, ClientResult};

use crate::config::SourceConfig;

/// Tokens are treated as expired this long before the provider's stated
/// expiry, so a token never dies mid-request.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    expires_at: Option<Instant>,
}

impl SessionState {
    fn valid_token(&self) -> Option<&str> {
        let expires_at = self.expires_at?;
        if Instant::now() >= expires_at {
            return None;
        }
        self.access_token.as_deref()
    }
}

/// Result of the initial authorization-code exchange.
#[derive(Debug, Clone)]
pub struct AuthorizationGrant {
    /// Access token for immediate use.
    pub access_token: String,
    /// Refresh token to persist for future sessions.
    pub refresh_token: String,
    /// Provider-stated lifetime in seconds.
    pub expires_in: u64,
}

/// Owns the OAuth session for the source CRM.
#[derive(Debug, Clone)]
pub struct TokenManager {
    http: Client,
    config: Arc<SourceConfig>,
    state: Arc<Mutex<SessionState>>,
}

impl TokenManager {
    /// Create a token manager sharing the client's HTTP pool.
    #[must_use]
    pub fn new(http: Client, config: Arc<SourceConfig>) -> Self {
        Self {
            http,
            config,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Get a valid access token, refreshing if absent or stale.
    ///
    /// The session lock is held across the refresh, so at most one refresh
    /// is in flight at any time.
    #[instrument(skip(self))]
    pub async fn get_valid(&self) -> ClientResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.valid_token() {
            return Ok(token.to_string());
        }
        self.refresh_locked(&mut state).await
    }

    /// Get a fresh token after `rejected` was refused by the source.
    ///
    /// A caller queued behind an in-flight refresh finds the cache already
    /// holding a different token and reuses it; only when the cached token
    /// is still the rejected one does this issue a token-endpoint call.
    #[instrument(skip(self, rejected))]
    pub async fn refresh_rejected(&self, rejected: &str) -> ClientResult<String> {
        let mut state = self.state.lock().await;
        if let Some(token) = state.valid_token() {
            if token != rejected {
                return Ok(token.to_string());
            }
        }
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(&self, state: &mut SessionState) -> ClientResult<String> {
        debug!("refreshing source access token");
        let grant = self.refresh_access_token().await?;

        let lifetime = grant.expires_in.saturating_sub(EXPIRY_MARGIN_SECS);
        state.access_token = Some(grant.access_token.clone());
        state.expires_at = Some(Instant::now() + Duration::from_secs(lifetime));

        info!(expires_in_secs = lifetime, "source access token refreshed");
        Ok(grant.access_token)
    }

    /// Drop the cached token so the next call refreshes.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.access_token = None;
        state.expires_at = None;
    }

    /// Exchange an authorization code for an initial token pair.
    ///
    /// Operator bootstrap path; the returned refresh token is what normal
    /// operation is configured with.
    #[instrument(skip(self, code))]
    pub async fn exchange_authorization_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> ClientResult<AuthorizationGrant> {
        let response = self.request_token(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("redirect_uri", redirect_uri),
            ("code", code),
        ])
        .await?;

        let refresh_token = response.refresh_token.ok_or_else(|| {
            ClientError::invalid_response("token endpoint returned no refresh_token")
        })?;

        Ok(AuthorizationGrant {
            access_token: response.access_token,
            refresh_token,
            expires_in: response.expires_in,
        })
    }

    async fn refresh_access_token(&self) -> ClientResult<TokenResponse> {
        self.request_token(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
            ("refresh_token", &self.config.refresh_token),
        ])
        .await
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> ClientResult<TokenResponse> {
        let response = self
            .http
            .post(self.config.token_url())
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ClientError::connection_failed_with_source("token endpoint unreachable", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token endpoint rejected request");
            return Err(ClientError::authentication_failed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        // The provider signals some grant failures inside a 200 body.
        let raw: RawTokenResponse = response.json().await.map_err(|e| {
            ClientError::invalid_response(format!("malformed token response: {e}"))
        })?;

        if let Some(error) = raw.error {
            return Err(ClientError::authentication_failed(format!(
                "token grant failed: {error}"
            )));
        }
        let access_token = raw.access_token.ok_or_else(|| {
            ClientError::invalid_response("token endpoint returned no access_token")
        })?;

        Ok(TokenResponse {
            access_token,
            refresh_token: raw.refresh_token,
            expires_in: raw.expires_in.unwrap_or(3600),
        })
    }
}

#[derive(Debug)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct RawTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}
