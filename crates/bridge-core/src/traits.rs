//! Client traits implemented by the concrete CRM clients.
//!
//! The sync engine only sees these traits; the HTTP clients in the source
//! and destination crates implement them, and tests substitute in-memory
//! fakes.

use async_trait::async_trait;

use crate::catalog::FieldDescriptor;
use crate::error::ClientResult;
use crate::record::{DestinationPayload, SourceRecord};
use crate::types::RecordType;

/// One page of source records plus the paging signals that came with it.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    /// Records in this page.
    pub records: Vec<SourceRecord>,
    /// Whether the source reports further pages.
    pub more_records: bool,
    /// Remaining-call quota from the response, when the source sent one.
    pub quota_remaining: Option<u32>,
}

/// Read side: the system records are synchronized from.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch one page of records. Pages are 1-indexed.
    async fn fetch_page(&self, record_type: RecordType, page: u32) -> ClientResult<ListPage>;

    /// Fetch the field catalog for a record type.
    async fn field_catalog(&self, record_type: RecordType) -> ClientResult<Vec<FieldDescriptor>>;
}

/// Write side: the system records are synchronized into.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Resolve a business key to an existing record identifier, if any.
    ///
    /// A point query limited to one result, using the match operator
    /// declared by the record type's business key.
    async fn find_by_key(
        &self,
        record_type: RecordType,
        key_value: &str,
    ) -> ClientResult<Option<String>>;

    /// Create a record, returning its new identifier.
    async fn create(
        &self,
        record_type: RecordType,
        payload: &DestinationPayload,
    ) -> ClientResult<String>;

    /// Partially update an existing record.
    async fn update(
        &self,
        record_type: RecordType,
        id: &str,
        payload: &DestinationPayload,
    ) -> ClientResult<()>;

    /// Fetch the property catalog for a record type's destination object.
    async fn property_catalog(&self, record_type: RecordType)
        -> ClientResult<Vec<FieldDescriptor>>;
}
