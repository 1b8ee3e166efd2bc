//! REST client for the destination CRM.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use bridge_core::{
    ClientError, ClientResult, DestinationPayload, FieldDescriptor, RecordStore, RecordType,
};

use crate::config::DestinationConfig;

/// Destination CRM client.
#[derive(Debug, Clone)]
pub struct DestinationClient {
    http: Client,
    config: DestinationConfig,
}

impl DestinationClient {
    /// Create a client from configuration.
    pub fn new(config: DestinationConfig) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ClientError::connection_failed_with_source("http client build", e))?;

        Ok(Self { http, config })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<Response> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout {
                        seconds: self.config.request_timeout_secs,
                    }
                } else {
                    ClientError::connection_failed_with_source("destination request failed", e)
                }
            })?;
        check_status(response).await
    }
}

/// Map a non-success response to the matching client error.
///
/// The bearer token is long-lived, so a 401 here is a credential problem,
/// not a refresh trigger.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ClientError::authentication_failed("destination rejected bearer token")
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            ClientError::RateLimited { retry_after_secs }
        }
        StatusCode::NOT_FOUND => ClientError::NotFound(response.url().path().to_string()),
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

#[async_trait]
impl RecordStore for DestinationClient {
    #[instrument(skip(self, key_value), fields(record_type = %record_type))]
    async fn find_by_key(
        &self,
        record_type: RecordType,
        key_value: &str,
    ) -> ClientResult<Option<String>> {
        let key = record_type.business_key();
        let url = format!(
            "{}/search",
            self.config.objects_url(record_type.destination_object())
        );
        let body = SearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![SearchFilter {
                    property_name: key.destination_property,
                    operator: key.matching.operator(),
                    value: key_value,
                }],
            }],
            limit: 1,
        };

        let response = self.send(self.http.post(&url).json(&body)).await?;
        let found: SearchResponse = response.json().await.map_err(|e| {
            ClientError::invalid_response(format!("malformed search response: {e}"))
        })?;

        let id = found.results.into_iter().next().map(|r| r.id);
        debug!(found = id.is_some(), "resolved business key");
        Ok(id)
    }

    #[instrument(skip(self, payload), fields(record_type = %record_type, properties = payload.len()))]
    async fn create(
        &self,
        record_type: RecordType,
        payload: &DestinationPayload,
    ) -> ClientResult<String> {
        let url = self.config.objects_url(record_type.destination_object());
        let response = self.send(self.http.post(&url).json(payload)).await?;
        let created: ObjectResponse = response.json().await.map_err(|e| {
            ClientError::invalid_response(format!("malformed create response: {e}"))
        })?;
        Ok(created.id)
    }

    #[instrument(skip(self, payload), fields(record_type = %record_type, properties = payload.len()))]
    async fn update(
        &self,
        record_type: RecordType,
        id: &str,
        payload: &DestinationPayload,
    ) -> ClientResult<()> {
        let url = format!(
            "{}/{id}",
            self.config.objects_url(record_type.destination_object())
        );
        self.send(self.http.patch(&url).json(payload)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(record_type = %record_type))]
    async fn property_catalog(
        &self,
        record_type: RecordType,
    ) -> ClientResult<Vec<FieldDescriptor>> {
        let url = self
            .config
            .properties_url(record_type.destination_object());
        let response = self.send(self.http.get(&url)).await?;
        let body: PropertiesResponse = response.json().await.map_err(|e| {
            ClientError::invalid_response(format!("malformed properties response: {e}"))
        })?;

        Ok(body
            .results
            .into_iter()
            .map(|p| FieldDescriptor::new(p.name, p.label))
            .collect())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchRequest<'a> {
    filter_groups: Vec<FilterGroup<'a>>,
    limit: u32,
}

#[derive(Debug, Serialize)]
struct FilterGroup<'a> {
    filters: Vec<SearchFilter<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchFilter<'a> {
    property_name: &'a str,
    operator: &'a str,
    value: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<ObjectResponse>,
}

#[derive(Debug, Deserialize)]
struct ObjectResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PropertiesResponse {
    results: Vec<RawProperty>,
}

#[derive(Debug, Deserialize)]
struct RawProperty {
    name: String,
    label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_request_wire_shape() {
        let body = SearchRequest {
            filter_groups: vec![FilterGroup {
                filters: vec![SearchFilter {
                    property_name: "email",
                    operator: "EQ",
                    value: "a@x.com",
                }],
            }],
            limit: 1,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "filterGroups": [
                    {"filters": [{"propertyName": "email", "operator": "EQ", "value": "a@x.com"}]}
                ],
                "limit": 1
            })
        );
    }

    #[test]
    fn test_search_response_first_id() {
        let body: SearchResponse =
            serde_json::from_str(r#"{"results": [{"id": "42"}], "total": 1}"#).unwrap();
        assert_eq!(body.results.into_iter().next().map(|r| r.id).as_deref(), Some("42"));

        let empty: SearchResponse = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(empty.results.is_empty());
    }

    #[test]
    fn test_properties_response_shape() {
        let body: PropertiesResponse = serde_json::from_str(
            r#"{"results": [{"name": "lead_contact_status", "label": "Lead Contact Status", "type": "enumeration"}]}"#,
        )
        .unwrap();
        assert_eq!(body.results[0].name, "lead_contact_status");
    }
}
