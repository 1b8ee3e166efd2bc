//! Run summaries.

use serde::{Deserialize, Serialize};

use bridge_core::RecordType;

use crate::mapper::UnmatchedField;

/// Terminal state of one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every available page was processed.
    Completed,
    /// The run stopped early at the quota floor; re-invoke to resume from
    /// the beginning.
    RateLimited,
}

impl RunOutcome {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::RateLimited => "rate_limited",
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Accounting for one sync run of one record type.
///
/// Unmatched source fields and skip counts are first-class fields here so
/// operators can judge a run's completeness from the trigger response
/// instead of digging through logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// The record type synchronized.
    pub record_type: RecordType,
    /// Pages fetched from the source.
    pub pages_fetched: u32,
    /// Records examined.
    pub processed: usize,
    /// Records created in the destination.
    pub created: usize,
    /// Records partially updated in the destination.
    pub updated: usize,
    /// Records skipped for an empty or missing business key.
    pub skipped_missing_key: usize,
    /// Records whose transform or upsert failed; details in the error sink.
    pub failed: usize,
    /// Source fields that matched neither the destination catalog nor the
    /// override table.
    pub unmatched_fields: Vec<UnmatchedField>,
    /// Terminal state.
    pub outcome: RunOutcome,
}

impl RunSummary {
    /// Create an empty summary for a record type.
    #[must_use]
    pub fn new(record_type: RecordType) -> Self {
        Self {
            record_type,
            pages_fetched: 0,
            processed: 0,
            created: 0,
            updated: 0,
            skipped_missing_key: 0,
            failed: 0,
            unmatched_fields: Vec::new(),
            outcome: RunOutcome::Completed,
        }
    }

    /// Records that reached the destination.
    #[must_use]
    pub fn written(&self) -> usize {
        self.created + self.updated
    }

    /// Whether every examined record was written.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.skipped_missing_key == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_accounting() {
        let mut summary = RunSummary::new(RecordType::Contact);
        summary.processed = 10;
        summary.created = 6;
        summary.updated = 2;
        summary.skipped_missing_key = 1;
        summary.failed = 1;

        assert_eq!(summary.written(), 8);
        assert!(!summary.is_clean());
    }

    #[test]
    fn test_outcome_serialization() {
        assert_eq!(
            serde_json::to_string(&RunOutcome::RateLimited).unwrap(),
            "\"rate_limited\""
        );
        assert_eq!(RunOutcome::Completed.as_str(), "completed");
    }
}
