//! Router configuration and trigger handlers.

use std::sync::Arc;

use axum::{extract::State, routing::{get, post}, Json, Router};
use serde::Serialize;

use bridge_core::RecordType;
use bridge_sync::{RunSummary, SyncPipeline};

use crate::error::Result as ApiResult;

/// Shared state for trigger handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SyncPipeline>,
}

/// Create the trigger router: one endpoint per record type.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sync/contacts", post(sync_contacts))
        .route("/sync/leads", post(sync_leads))
        .route("/sync/deals", post(sync_deals))
        .route("/sync/accounts", post(sync_accounts))
        .with_state(state)
}

/// Response for a sync trigger: the run summary.
#[derive(Debug, Serialize)]
pub struct SyncTriggerResponse {
    pub record_type: String,
    pub outcome: String,
    pub pages_fetched: u32,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped_missing_key: usize,
    pub failed: usize,
    pub unmatched_fields: Vec<String>,
}

impl From<RunSummary> for SyncTriggerResponse {
    fn from(summary: RunSummary) -> Self {
        Self {
            record_type: summary.record_type.to_string(),
            outcome: summary.outcome.to_string(),
            pages_fetched: summary.pages_fetched,
            processed: summary.processed,
            created: summary.created,
            updated: summary.updated,
            skipped_missing_key: summary.skipped_missing_key,
            failed: summary.failed,
            unmatched_fields: summary
                .unmatched_fields
                .into_iter()
                .map(|u| u.api_name)
                .collect(),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn run_sync(state: AppState, record_type: RecordType) -> ApiResult<Json<SyncTriggerResponse>> {
    let summary = state.pipeline.run(record_type).await?;
    Ok(Json(summary.into()))
}

async fn sync_contacts(State(state): State<AppState>) -> ApiResult<Json<SyncTriggerResponse>> {
    run_sync(state, RecordType::Contact).await
}

async fn sync_leads(State(state): State<AppState>) -> ApiResult<Json<SyncTriggerResponse>> {
    run_sync(state, RecordType::Lead).await
}

async fn sync_deals(State(state): State<AppState>) -> ApiResult<Json<SyncTriggerResponse>> {
    run_sync(state, RecordType::Deal).await
}

async fn sync_accounts(State(state): State<AppState>) -> ApiResult<Json<SyncTriggerResponse>> {
    run_sync(state, RecordType::Account).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_sync::RunOutcome;

    #[test]
    fn test_trigger_response_from_summary() {
        let mut summary = RunSummary::new(RecordType::Contact);
        summary.pages_fetched = 3;
        summary.processed = 250;
        summary.created = 200;
        summary.updated = 40;
        summary.skipped_missing_key = 8;
        summary.failed = 2;
        summary.outcome = RunOutcome::RateLimited;

        let response = SyncTriggerResponse::from(summary);
        assert_eq!(response.record_type, "contact");
        assert_eq!(response.outcome, "rate_limited");
        assert_eq!(response.created, 200);
        assert!(response.unmatched_fields.is_empty());
    }
}
