//! Sync pipeline orchestration.
//!
//! One `run` performs a full linear pass for a record type: build the
//! field map from both catalogs, then fetch pages and, per record, extract
//! the business key, transform, and upsert. Per-record failures are
//! accumulated into the error sink and never abort the page loop; a quota
//! floor ends the run early with a partial outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use bridge_core::{RecordSource, RecordStore, RecordType, SourceRecord};

use crate::error::{SyncError, SyncResult};
use crate::mapper::{FieldMap, FieldMapper};
use crate::pager::{PageEnd, PageHandler, PaginationDriver};
use crate::resolver::{UpsertOutcome, UpsertResolver};
use crate::settings::SyncSettings;
use crate::sink::{ErrorRecord, ErrorSink};
use crate::summary::{RunOutcome, RunSummary};
use crate::transform::Transformer;

/// Orchestrates fetch, map, transform, resolve and upsert for one record
/// type at a time.
pub struct SyncPipeline {
    source: Arc<dyn RecordSource>,
    resolver: UpsertResolver<dyn RecordStore>,
    store: Arc<dyn RecordStore>,
    mapper: FieldMapper,
    transformer: Transformer,
    sink: ErrorSink,
    settings: SyncSettings,
}

impl SyncPipeline {
    /// Start building a pipeline.
    #[must_use]
    pub fn builder() -> SyncPipelineBuilder {
        SyncPipelineBuilder::new()
    }

    /// Run a full synchronization pass for one record type.
    ///
    /// A failure while building the field map is fatal for the run; from
    /// then on, failures are per-record and the pass continues.
    #[instrument(skip(self), fields(record_type = %record_type))]
    pub async fn run(&self, record_type: RecordType) -> SyncResult<RunSummary> {
        let field_map = self.build_field_map(record_type).await?;

        let mut summary = RunSummary::new(record_type);
        summary.unmatched_fields = field_map.unmatched().to_vec();

        let mut processor = RecordProcessor {
            record_type,
            field_map: &field_map,
            transformer: &self.transformer,
            resolver: &self.resolver,
            summary: &mut summary,
            errors: Vec::new(),
        };

        let driver = PaginationDriver::new(self.source.as_ref(), self.settings.quota_floor);
        let report = driver.drive(record_type, &mut processor).await?;

        let errors = processor.errors;
        summary.pages_fetched = report.pages_fetched;
        summary.outcome = match report.end {
            PageEnd::Exhausted => RunOutcome::Completed,
            PageEnd::QuotaFloor { .. } => RunOutcome::RateLimited,
        };

        self.sink.flush(&errors);
        info!(
            outcome = %summary.outcome,
            processed = summary.processed,
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped_missing_key,
            failed = summary.failed,
            "sync run finished"
        );
        Ok(summary)
    }

    /// Fetch both catalogs and build the field map.
    async fn build_field_map(&self, record_type: RecordType) -> SyncResult<FieldMap> {
        let source_fields = self.source.field_catalog(record_type).await?;
        let destination_properties = self.store.property_catalog(record_type).await?;

        if source_fields.is_empty() {
            return Err(SyncError::mapping(format!(
                "source catalog for {record_type} is empty"
            )));
        }

        let field_map = self.mapper.build(&source_fields, &destination_properties);
        info!(
            mapped = field_map.len(),
            unmatched = field_map.unmatched().len(),
            "field map built"
        );
        Ok(field_map)
    }
}

/// Per-run page handler: processes each record of each page.
struct RecordProcessor<'a> {
    record_type: RecordType,
    field_map: &'a FieldMap,
    transformer: &'a Transformer,
    resolver: &'a UpsertResolver<dyn RecordStore>,
    summary: &'a mut RunSummary,
    errors: Vec<ErrorRecord>,
}

impl RecordProcessor<'_> {
    async fn process_record(&mut self, record: &SourceRecord) {
        self.summary.processed += 1;

        let key = self.record_type.business_key();
        let Some(key_value) = record.get_str(key.source_field).map(str::to_string) else {
            self.summary.skipped_missing_key += 1;
            return;
        };

        let outcome = self
            .transformer
            .transform(self.record_type, record, self.field_map);
        for warning in &outcome.warnings {
            warn!(business_key = %key_value, "{warning}");
        }

        match self
            .resolver
            .upsert(self.record_type, &key_value, &outcome.payload)
            .await
        {
            Ok(UpsertOutcome::Created(_)) => self.summary.created += 1,
            Ok(UpsertOutcome::Updated(_)) => self.summary.updated += 1,
            Err(e) => {
                self.summary.failed += 1;
                self.errors.push(ErrorRecord::new(
                    self.record_type,
                    record.source_id().map(str::to_string),
                    Some(key_value),
                    e.to_string(),
                ));
            }
        }
    }
}

#[async_trait]
impl PageHandler for RecordProcessor<'_> {
    async fn handle_page(&mut self, records: Vec<SourceRecord>) -> SyncResult<()> {
        for record in &records {
            self.process_record(record).await;
        }
        Ok(())
    }
}

/// Builder for [`SyncPipeline`].
#[derive(Default)]
pub struct SyncPipelineBuilder {
    source: Option<Arc<dyn RecordSource>>,
    store: Option<Arc<dyn RecordStore>>,
    mapper: Option<FieldMapper>,
    transformer: Option<Transformer>,
    settings: Option<SyncSettings>,
}

impl SyncPipelineBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the record source.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn RecordSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the destination store.
    #[must_use]
    pub fn store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the default field mapper.
    #[must_use]
    pub fn mapper(mut self, mapper: FieldMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Override the default transformer.
    #[must_use]
    pub fn transformer(mut self, transformer: Transformer) -> Self {
        self.transformer = Some(transformer);
        self
    }

    /// Set engine settings.
    #[must_use]
    pub fn settings(mut self, settings: SyncSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Build the pipeline.
    pub fn build(self) -> SyncResult<SyncPipeline> {
        let source = self
            .source
            .ok_or_else(|| SyncError::configuration("record source is required"))?;
        let store = self
            .store
            .ok_or_else(|| SyncError::configuration("record store is required"))?;
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let transformer = self.transformer.unwrap_or_else(|| {
            Transformer::new(crate::lookup::TransformRegistry::builtin())
        });

        Ok(SyncPipeline {
            source,
            resolver: UpsertResolver::new(Arc::clone(&store)),
            store,
            mapper: self.mapper.unwrap_or_default(),
            transformer,
            sink: ErrorSink::new(settings.error_log_path.clone()),
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::{ClientError, ClientResult, DestinationPayload, FieldDescriptor, ListPage};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct FakeSource {
        catalog: Vec<FieldDescriptor>,
        pages: Mutex<Vec<ListPage>>,
        catalog_error: Option<fn() -> ClientError>,
    }

    impl FakeSource {
        fn new(catalog: Vec<FieldDescriptor>, pages: Vec<ListPage>) -> Self {
            Self {
                catalog,
                pages: Mutex::new(pages),
                catalog_error: None,
            }
        }
    }

    #[async_trait]
    impl RecordSource for FakeSource {
        async fn fetch_page(
            &self,
            _record_type: RecordType,
            _page: u32,
        ) -> ClientResult<ListPage> {
            let mut pages = self.pages.lock().unwrap();
            if pages.is_empty() {
                Ok(ListPage::default())
            } else {
                Ok(pages.remove(0))
            }
        }

        async fn field_catalog(
            &self,
            _record_type: RecordType,
        ) -> ClientResult<Vec<FieldDescriptor>> {
            if let Some(make_error) = self.catalog_error {
                return Err(make_error());
            }
            Ok(self.catalog.clone())
        }
    }

    #[derive(Default)]
    struct FakeStore {
        catalog: Vec<FieldDescriptor>,
        existing: Mutex<HashMap<String, String>>,
        creates: Mutex<Vec<DestinationPayload>>,
        updates: Mutex<Vec<(String, DestinationPayload)>>,
        fail_creates: bool,
    }

    #[async_trait]
    impl RecordStore for FakeStore {
        async fn find_by_key(
            &self,
            _record_type: RecordType,
            key_value: &str,
        ) -> ClientResult<Option<String>> {
            Ok(self.existing.lock().unwrap().get(key_value).cloned())
        }

        async fn create(
            &self,
            _record_type: RecordType,
            payload: &DestinationPayload,
        ) -> ClientResult<String> {
            if self.fail_creates {
                return Err(ClientError::Api {
                    status: 400,
                    message: "validation error".to_string(),
                });
            }
            let mut creates = self.creates.lock().unwrap();
            creates.push(payload.clone());
            Ok(format!("new-{}", creates.len()))
        }

        async fn update(
            &self,
            _record_type: RecordType,
            id: &str,
            payload: &DestinationPayload,
        ) -> ClientResult<()> {
            self.updates
                .lock()
                .unwrap()
                .push((id.to_string(), payload.clone()));
            Ok(())
        }

        async fn property_catalog(
            &self,
            _record_type: RecordType,
        ) -> ClientResult<Vec<FieldDescriptor>> {
            Ok(self.catalog.clone())
        }
    }

    fn contact_catalogs() -> (Vec<FieldDescriptor>, Vec<FieldDescriptor>) {
        (
            vec![
                FieldDescriptor::new("Email", "Email"),
                FieldDescriptor::new("Lead_Status", "Lead Status"),
            ],
            vec![
                FieldDescriptor::new("email", "Email"),
                FieldDescriptor::new("lead_contact_status", "Lead Status"),
            ],
        )
    }

    fn record(value: serde_json::Value) -> SourceRecord {
        serde_json::from_value(value).unwrap()
    }

    fn one_page(records: Vec<SourceRecord>) -> Vec<ListPage> {
        vec![ListPage {
            records,
            more_records: false,
            quota_remaining: Some(100),
        }]
    }

    fn build_pipeline(source: FakeSource, store: FakeStore) -> SyncPipeline {
        let dir = tempfile::tempdir().unwrap();
        SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::new(store))
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: dir.path().join("errors.jsonl"),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_creates_new_record_end_to_end() {
        let (source_catalog, store_catalog) = contact_catalogs();
        let source = FakeSource::new(
            source_catalog,
            one_page(vec![record(json!({
                "id": "1001",
                "Email": "a@x.com",
                "Lead_Status": "Qualified",
            }))]),
        );
        let store = FakeStore {
            catalog: store_catalog,
            ..FakeStore::default()
        };
        let store = Arc::new(store);

        let dir = tempfile::tempdir().unwrap();
        let pipeline = SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::clone(&store) as Arc<dyn RecordStore>)
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: dir.path().join("errors.jsonl"),
            })
            .build()
            .unwrap();

        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.outcome, RunOutcome::Completed);

        let creates = store.creates.lock().unwrap();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].get("email"), Some("a@x.com"));
        assert_eq!(creates[0].get("lead_contact_status"), Some("QUALIFIED"));
        assert!(store.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_updates_existing_record() {
        let (source_catalog, store_catalog) = contact_catalogs();
        let source = FakeSource::new(
            source_catalog,
            one_page(vec![record(json!({"Email": "a@x.com"}))]),
        );
        let store = FakeStore {
            catalog: store_catalog,
            ..FakeStore::default()
        };
        store
            .existing
            .lock()
            .unwrap()
            .insert("a@x.com".to_string(), "42".to_string());
        let store = Arc::new(store);

        let dir = tempfile::tempdir().unwrap();
        let pipeline = SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::clone(&store) as Arc<dyn RecordStore>)
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: dir.path().join("errors.jsonl"),
            })
            .build()
            .unwrap();

        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.created, 0);
        assert_eq!(store.updates.lock().unwrap()[0].0, "42");
        assert!(store.creates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_business_key_skips_without_destination_calls() {
        let (source_catalog, store_catalog) = contact_catalogs();
        let source = FakeSource::new(
            source_catalog,
            one_page(vec![
                record(json!({"Lead_Status": "Qualified"})),
                record(json!({"Email": ""})),
            ]),
        );
        let store = Arc::new(FakeStore {
            catalog: store_catalog,
            ..FakeStore::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let pipeline = SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::clone(&store) as Arc<dyn RecordStore>)
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: dir.path().join("errors.jsonl"),
            })
            .build()
            .unwrap();

        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped_missing_key, 2);
        assert!(store.creates.lock().unwrap().is_empty());
        assert!(store.updates.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_per_record_failure_does_not_abort_run() {
        let (source_catalog, store_catalog) = contact_catalogs();
        let source = FakeSource::new(
            source_catalog,
            one_page(vec![
                record(json!({"Email": "first@x.com"})),
                record(json!({"Email": "second@x.com"})),
            ]),
        );
        let store = FakeStore {
            catalog: store_catalog,
            fail_creates: true,
            ..FakeStore::default()
        };

        let dir = tempfile::tempdir().unwrap();
        let error_log_path = dir.path().join("errors.jsonl");
        let pipeline = SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::new(store))
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: error_log_path.clone(),
            })
            .build()
            .unwrap();

        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.outcome, RunOutcome::Completed);

        let contents = std::fs::read_to_string(&error_log_path).unwrap();
        assert_eq!(contents.lines().count(), 2);
        let first: ErrorRecord = serde_json::from_str(contents.lines().next().unwrap()).unwrap();
        assert_eq!(first.business_key.as_deref(), Some("first@x.com"));
    }

    #[tokio::test]
    async fn test_quota_floor_yields_partial_outcome() {
        let (source_catalog, store_catalog) = contact_catalogs();
        let pages = vec![
            ListPage {
                records: vec![record(json!({"Email": "a@x.com"}))],
                more_records: true,
                quota_remaining: Some(1),
            },
            ListPage {
                records: vec![record(json!({"Email": "never@x.com"}))],
                more_records: false,
                quota_remaining: Some(0),
            },
        ];
        let source = FakeSource::new(source_catalog, pages);
        let store = Arc::new(FakeStore {
            catalog: store_catalog,
            ..FakeStore::default()
        });

        let dir = tempfile::tempdir().unwrap();
        let pipeline = SyncPipeline::builder()
            .source(Arc::new(source))
            .store(Arc::clone(&store) as Arc<dyn RecordStore>)
            .settings(SyncSettings {
                quota_floor: 1,
                error_log_path: dir.path().join("errors.jsonl"),
            })
            .build()
            .unwrap();

        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::RateLimited);
        assert_eq!(summary.pages_fetched, 1);
        assert_eq!(summary.processed, 1);
        assert_eq!(store.creates.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_token_failure_during_field_map_is_fatal() {
        let mut source = FakeSource::new(Vec::new(), Vec::new());
        source.catalog_error = Some(|| ClientError::TokenExpired);
        let store = FakeStore::default();

        let pipeline = build_pipeline(source, store);
        let err = pipeline.run(RecordType::Contact).await.unwrap_err();
        assert!(err.is_token_failure());
    }

    #[tokio::test]
    async fn test_unmatched_fields_surface_in_summary() {
        let source = FakeSource::new(
            vec![
                FieldDescriptor::new("Email", "Email"),
                FieldDescriptor::new("Custom_Blob", "Custom Blob"),
            ],
            one_page(vec![record(json!({"Email": "a@x.com"}))]),
        );
        let store = FakeStore {
            catalog: vec![FieldDescriptor::new("email", "Email")],
            ..FakeStore::default()
        };

        let pipeline = build_pipeline(source, store);
        let summary = pipeline.run(RecordType::Contact).await.unwrap();

        assert_eq!(summary.unmatched_fields.len(), 1);
        assert_eq!(summary.unmatched_fields[0].api_name, "Custom_Blob");
    }

    #[test]
    fn test_builder_requires_source_and_store() {
        assert!(SyncPipeline::builder().build().is_err());
    }
}
