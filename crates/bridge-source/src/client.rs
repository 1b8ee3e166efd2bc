//! Authorized REST client for the source CRM.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use bridge_core::{
    ClientError, ClientResult, FieldDescriptor, ListPage, RecordSource, RecordType, SourceRecord,
};

use crate::config::SourceConfig;
use crate::token::TokenManager;

/// Response header carrying the remaining-call quota.
const QUOTA_HEADER: &str = "x-ratelimit-remaining";

/// Source CRM client.
///
/// Every call goes through [`SourceClient::get_authorized`], which attaches
/// a valid access token and, on a 401, forces one refresh and retries the
/// call exactly once before propagating [`ClientError::TokenExpired`].
#[derive(Debug, Clone)]
pub struct SourceClient {
    http: Client,
    config: Arc<SourceConfig>,
    tokens: TokenManager,
}

impl SourceClient {
    /// Create a client from configuration.
    pub fn new(config: SourceConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::connection_failed_with_source("http client build", e))?;

        let config = Arc::new(config);
        let tokens = TokenManager::new(http.clone(), Arc::clone(&config));

        Ok(Self {
            http,
            config,
            tokens,
        })
    }

    /// The token manager backing this client.
    #[must_use]
    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Issue an authorized GET, refreshing the token once on rejection.
    async fn get_authorized(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> ClientResult<Response> {
        let token = self.tokens.get_valid().await?;
        let response = self.send_get(url, query, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return check_status(response).await;
        }

        // One refresh, one retry. A second rejection is final.
        warn!(url, "access token rejected, refreshing once");
        let token = self.tokens.refresh_rejected(&token).await?;
        let response = self.send_get(url, query, &token).await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ClientError::TokenExpired);
        }
        check_status(response).await
    }

    async fn send_get(
        &self,
        url: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> ClientResult<Response> {
        self.http
            .get(url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        seconds: self.config.request_timeout_secs,
                    }
                } else {
                    ClientError::connection_failed_with_source("source request failed", e)
                }
            })
    }
}

/// Map a non-success response to the matching client error.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error = match status {
        StatusCode::UNAUTHORIZED => ClientError::TokenExpired,
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            ClientError::RateLimited { retry_after_secs }
        }
        StatusCode::NOT_FOUND => {
            ClientError::NotFound(response.url().path().to_string())
        }
        _ => {
            let body = response.text().await.unwrap_or_default();
            ClientError::Api {
                status: status.as_u16(),
                message: body,
            }
        }
    };
    Err(error)
}

fn quota_remaining(response: &Response) -> Option<u32> {
    response
        .headers()
        .get(QUOTA_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u32>().ok())
}

#[async_trait]
impl RecordSource for SourceClient {
    #[instrument(skip(self), fields(record_type = %record_type))]
    async fn fetch_page(&self, record_type: RecordType, page: u32) -> ClientResult<ListPage> {
        let url = self.config.list_url(record_type.source_module());
        let query = [
            ("page", page.to_string()),
            ("per_page", self.config.page_size.to_string()),
        ];
        let response = self.get_authorized(&url, &query).await?;
        let quota = quota_remaining(&response);

        // The source answers an empty module with 204 and no body.
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(ListPage {
                records: Vec::new(),
                more_records: false,
                quota_remaining: quota,
            });
        }

        let body: ListResponse = response
            .json()
            .await
            .map_err(|e| ClientError::invalid_response(format!("malformed list response: {e}")))?;

        let records = body.data.unwrap_or_default();
        let more_records = body.info.map(|i| i.more_records).unwrap_or(false);
        debug!(
            page,
            count = records.len(),
            more_records,
            quota = ?quota,
            "fetched source page"
        );

        Ok(ListPage {
            records,
            more_records,
            quota_remaining: quota,
        })
    }

    #[instrument(skip(self), fields(record_type = %record_type))]
    async fn field_catalog(&self, record_type: RecordType) -> ClientResult<Vec<FieldDescriptor>> {
        let url = self.config.fields_url();
        let query = [("module", record_type.source_module().to_string())];
        let response = self.get_authorized(&url, &query).await?;

        let body: FieldsResponse = response.json().await.map_err(|e| {
            ClientError::invalid_response(format!("malformed fields response: {e}"))
        })?;

        Ok(body
            .fields
            .into_iter()
            .map(|f| FieldDescriptor::new(f.api_name, f.field_label))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    data: Option<Vec<SourceRecord>>,
    info: Option<PageInfo>,
}

#[derive(Debug, Deserialize)]
struct PageInfo {
    #[serde(default)]
    more_records: bool,
}

#[derive(Debug, Deserialize)]
struct FieldsResponse {
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    api_name: String,
    field_label: String,
}
