//! Synchronization engine.
//!
//! Composes the field mapper, value transformer, upsert resolver and
//! pagination driver into one fetch, map, transform, resolve, upsert cycle
//! per record type. Per-record failures are contained and accumulated into
//! an error sink; rate-limit signals halt pagination voluntarily and
//! surface as a partial-completion outcome.

pub mod error;
pub mod lookup;
pub mod mapper;
pub mod pager;
pub mod pipeline;
pub mod resolver;
pub mod settings;
pub mod sink;
pub mod summary;
pub mod transform;

mod derived;

pub use error::{SyncError, SyncResult};
pub use lookup::{LookupTable, TransformRegistry, TransformRule};
pub use mapper::{FieldMap, FieldMapper, UnmatchedField};
pub use pager::{PageDriveReport, PageEnd, PageHandler, PaginationDriver};
pub use pipeline::{SyncPipeline, SyncPipelineBuilder};
pub use resolver::{UpsertOutcome, UpsertResolver};
pub use settings::SyncSettings;
pub use sink::{ErrorRecord, ErrorSink};
pub use summary::{RunOutcome, RunSummary};
pub use transform::{TransformOutcome, Transformer};
