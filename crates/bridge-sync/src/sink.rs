//! Durable error sink.
//!
//! Per-record failures are appended to a JSON-lines file at the end of the
//! run. A sink write failure is logged and dropped; it never fails the
//! pipeline.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use bridge_core::RecordType;

/// One failed per-record upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Record type being synchronized.
    pub record_type: RecordType,
    /// Source-internal identifier, when the record had one.
    pub source_id: Option<String>,
    /// Business key, when the record had one.
    pub business_key: Option<String>,
    /// Failure detail.
    pub error: String,
    /// When the failure occurred.
    pub occurred_at: DateTime<Utc>,
}

impl ErrorRecord {
    /// Create an error record stamped with the current time.
    #[must_use]
    pub fn new(
        record_type: RecordType,
        source_id: Option<String>,
        business_key: Option<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            source_id,
            business_key,
            error: error.into(),
            occurred_at: Utc::now(),
        }
    }
}

/// Append-only JSON-lines sink for [`ErrorRecord`]s.
#[derive(Debug, Clone)]
pub struct ErrorSink {
    path: PathBuf,
}

impl ErrorSink {
    /// Create a sink writing to the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The sink's file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the accumulated errors, one JSON object per line.
    ///
    /// Failures to write are logged at warn and swallowed.
    pub fn flush(&self, errors: &[ErrorRecord]) {
        if errors.is_empty() {
            return;
        }
        if let Err(e) = self.try_flush(errors) {
            warn!(path = %self.path.display(), error = %e, "failed to write error sink");
            return;
        }
        info!(
            path = %self.path.display(),
            count = errors.len(),
            "logged per-record sync errors"
        );
    }

    fn try_flush(&self, errors: &[ErrorRecord]) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        for error in errors {
            let line = serde_json::to_string(error)?;
            writeln!(file, "{line}")?;
        }
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_flush_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        let sink = ErrorSink::new(&path);

        sink.flush(&[ErrorRecord::new(
            RecordType::Contact,
            Some("1001".to_string()),
            Some("a@x.com".to_string()),
            "destination validation error",
        )]);
        sink.flush(&[ErrorRecord::new(
            RecordType::Deal,
            None,
            Some("Acme renewal".to_string()),
            "timeout",
        )]);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: ErrorRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.record_type, RecordType::Contact);
        assert_eq!(first.business_key.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_empty_flush_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.jsonl");
        ErrorSink::new(&path).flush(&[]);
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_does_not_panic() {
        let sink = ErrorSink::new("/nonexistent-dir/errors.jsonl");
        sink.flush(&[ErrorRecord::new(RecordType::Lead, None, None, "boom")]);
    }
}
