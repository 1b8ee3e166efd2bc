//! Derived destination properties.
//!
//! These properties are never taken from the generic field map. They are
//! recomputed from structured sub-objects on the source record (owner,
//! audit stamps, parent-account linkage) and from the record's timestamps,
//! and written after the generic pass so they overwrite anything the map
//! produced for the same keys.

use chrono::DateTime;
use serde_json::Value as JsonValue;

use bridge_core::{DestinationPayload, RecordType, SourceRecord};

/// Apply all derived properties for a record. Last writer, always wins.
pub fn apply(record_type: RecordType, record: &SourceRecord, payload: &mut DestinationPayload) {
    set_ref(payload, record, "Owner", "id", "zoho_lead_id");
    set_ref(payload, record, "Owner", "id", "ownerid");
    set_ref(payload, record, "Owner", "name", "zoho_lead_name");
    set_ref(payload, record, "Owner", "email", "zoho_lead_email");

    set_ref(payload, record, "BDR_Owner", "id", "zoho_bdr_id");

    set_ref(payload, record, "Modified_By", "id", "modified_by_id");
    set_ref(payload, record, "Modified_By", "name", "modified_by_name");
    set_ref(payload, record, "Modified_By", "email", "modified_by_email");
    set_ref(payload, record, "Created_By", "id", "created_by_id");
    set_ref(payload, record, "Created_By", "name", "created_by_name");
    set_ref(payload, record, "Created_By", "email", "created_by_email");

    set_ref(payload, record, "Account_Name", "id", "account_id");
    set_ref(payload, record, "Account_Name", "name", "account_name");
    set_ref(payload, record, "Reporting_To", "id", "reporting_to_id");
    set_ref(payload, record, "Reporting_To", "name", "reporting_to_name");

    set_millis(payload, record, "Created_Time", "created_time");
    set_millis(payload, record, "Modified_Time", "modified_time");
    set_millis(payload, record, "Last_Activity_Time", "last_activity_time");

    payload.set("object_status", record_type.source_module().trim_end_matches('s'));
}

/// Copy one attribute of a structured reference field into the payload.
fn set_ref(
    payload: &mut DestinationPayload,
    record: &SourceRecord,
    field: &str,
    attribute: &str,
    property: &str,
) {
    let value = record
        .get_object(field)
        .and_then(|obj| obj.get(attribute))
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty());
    if let Some(value) = value {
        payload.set(property, value);
    }
}

/// Write a source timestamp as UTC epoch milliseconds.
fn set_millis(
    payload: &mut DestinationPayload,
    record: &SourceRecord,
    field: &str,
    property: &str,
) {
    if let Some(millis) = record.get_str(field).and_then(utc_millis) {
        payload.set(property, millis.to_string());
    }
}

/// Parse an RFC 3339 timestamp into UTC epoch milliseconds.
#[must_use]
pub fn utc_millis(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp_millis())
}
