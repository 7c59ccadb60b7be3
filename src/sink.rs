//! Audit record sinks.
//!
//! Scanned opportunities and execution records are streamed to a sink
//! for offline analysis. Sinks are best-effort: a full disk must never
//! take the trading loop down, so failures are logged and dropped.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::domain::{ArbOpportunity, ExecutionRecord};

/// Destination for audit records.
pub trait RecordSink: Send + Sync {
    /// Record the accepted opportunities of one scan pass.
    fn record_opportunities(&self, opportunities: &[ArbOpportunity]);

    /// Record a finished execution attempt.
    fn record_execution(&self, record: &ExecutionRecord);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RecordSink for NullSink {
    fn record_opportunities(&self, _opportunities: &[ArbOpportunity]) {}

    fn record_execution(&self, _record: &ExecutionRecord) {}
}

#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    ts: String,
    #[serde(flatten)]
    record: &'a T,
}

/// Append-only JSONL files under a data directory:
/// `opportunities.jsonl` and `executions.jsonl`, one timestamped record
/// per line.
#[derive(Debug, Clone)]
pub struct JsonlSink {
    dir: PathBuf,
}

impl JsonlSink {
    /// Create the sink, ensuring the directory exists.
    ///
    /// # Errors
    ///
    /// Returns the underlying IO error if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn append<T: Serialize>(&self, file_name: &str, records: &[T]) {
        if records.is_empty() {
            return;
        }
        let path = self.dir.join(file_name);
        if let Err(e) = self.try_append(&path, records) {
            warn!(path = %path.display(), error = %e, "failed to append audit records");
        }
    }

    fn try_append<T: Serialize>(&self, path: &Path, records: &[T]) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        let ts = Utc::now().to_rfc3339();
        for record in records {
            let line = serde_json::to_string(&Stamped {
                ts: ts.clone(),
                record,
            })?;
            writeln!(file, "{line}")?;
        }
        Ok(())
    }
}

impl RecordSink for JsonlSink {
    fn record_opportunities(&self, opportunities: &[ArbOpportunity]) {
        self.append("opportunities.jsonl", opportunities);
    }

    fn record_execution(&self, record: &ExecutionRecord) {
        self.append("executions.jsonl", std::slice::from_ref(record));
    }
}
