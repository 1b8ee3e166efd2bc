//! Per-record value transformation.

use tracing::warn;

use bridge_core::{DestinationPayload, FieldKind, FieldValue, RecordType, SourceRecord};

use crate::derived;
use crate::lookup::{TransformRegistry, TransformRule, LIST_DELIMITER};
use crate::mapper::FieldMap;

/// Result of transforming one source record.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// The destination properties body.
    pub payload: DestinationPayload,
    /// Values that missed their lookup table and were skipped.
    pub warnings: Vec<String>,
}

/// Transforms source records into destination payloads.
///
/// For each mapped field: empty values are omitted entirely, enumerated
/// properties go through their lookup table (miss means warn and skip),
/// multi-value properties are joined with [`LIST_DELIMITER`], and plain
/// scalars are stringified. Derived properties are applied last and
/// overwrite the generic pass.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    registry: TransformRegistry,
}

impl Transformer {
    /// Create a transformer over a rule registry.
    #[must_use]
    pub fn new(registry: TransformRegistry) -> Self {
        Self { registry }
    }

    /// Transform one record.
    #[must_use]
    pub fn transform(
        &self,
        record_type: RecordType,
        record: &SourceRecord,
        field_map: &FieldMap,
    ) -> TransformOutcome {
        let mut payload = DestinationPayload::new();
        let mut warnings = Vec::new();

        for (source_field, property) in field_map.iter() {
            let value = record.get(source_field);

            match self.registry.get(record_type, property) {
                Some(TransformRule::Enumerated(table)) => {
                    let Some(raw) = value.and_then(FieldValue::to_scalar_string) else {
                        continue;
                    };
                    match table.get(&raw) {
                        Some(mapped) => payload.set(property, mapped),
                        None => {
                            let message =
                                format!("unmapped value {raw:?} for property {property:?}");
                            warn!(property, raw, "skipping unmapped enumeration value");
                            warnings.push(message);
                        }
                    }
                }
                Some(TransformRule::MultiValue { empty_when_missing }) => {
                    match value.and_then(FieldValue::as_list).filter(|l| !l.is_empty()) {
                        Some(items) => payload.set(property, join_list(items)),
                        None if *empty_when_missing => payload.set(property, ""),
                        None => {
                            warnings.push(format!("no values for multi-value {property:?}"));
                        }
                    }
                }
                None => {
                    let Some(value) = value else { continue };
                    match value.kind() {
                        FieldKind::Scalar => {
                            if let Some(s) = value.to_scalar_string() {
                                payload.set(property, s);
                            }
                        }
                        FieldKind::MultiValue => {
                            if let Some(items) =
                                value.as_list().filter(|l| !l.is_empty())
                            {
                                payload.set(property, join_list(items));
                            }
                        }
                        // Structured fields only reach the destination
                        // through the derived pass below.
                        FieldKind::Empty | FieldKind::Structured => {}
                    }
                }
            }
        }

        derived::apply(record_type, record, &mut payload);

        TransformOutcome { payload, warnings }
    }
}

fn join_list(items: &[FieldValue]) -> String {
    items
        .iter()
        .filter_map(FieldValue::to_scalar_string)
        .collect::<Vec<_>>()
        .join(LIST_DELIMITER)
}
