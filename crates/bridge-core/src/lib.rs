//! Shared record model and client traits for the CRM sync bridge.
//!
//! This crate defines the value and record types that flow through the
//! synchronization engine, the catalog descriptors used by the field
//! mapper, the error type shared by both CRM clients, and the traits
//! (`RecordSource`, `RecordStore`) that the concrete HTTP clients
//! implement.

pub mod catalog;
pub mod error;
pub mod record;
pub mod traits;
pub mod types;
pub mod value;

pub use catalog::FieldDescriptor;
pub use error::{ClientError, ClientResult};
pub use record::{DestinationPayload, SourceRecord};
pub use traits::{ListPage, RecordSource, RecordStore};
pub use types::{BusinessKey, KeyMatch, RecordType};
pub use value::{FieldKind, FieldValue};
