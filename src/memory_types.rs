//! Memory record data types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Source recorded for memories stored by hand from the CLI.
pub const SOURCE_MANUAL: &str = "manual";

const RESERVED_KEYS: [&str; 2] = ["timestamp", "source"];

/// Metadata attached to every record.
///
/// Serialized as a flat JSON object: `{"timestamp": ..., "source": ..., <extra>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Local time of storage, RFC 3339.
    pub timestamp: String,
    /// Where the memory came from (`manual` for CLI input).
    pub source: String,
    /// Caller-supplied extra fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl Metadata {
    /// Metadata stamped with the current local time.
    pub fn now(source: &str) -> Self {
        Self::at(source, &Local::now())
    }

    /// Metadata stamped with `time`.
    pub fn at(source: &str, time: &DateTime<Local>) -> Self {
        Self {
            timestamp: time.to_rfc3339(),
            source: source.to_string(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra field. `timestamp` and `source` cannot be overridden.
    pub fn insert_extra(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::InvalidInput("metadata key cannot be empty".to_string()));
        }
        if RESERVED_KEYS.contains(&key) {
            return Err(Error::InvalidInput(format!(
                "metadata key '{key}' is reserved"
            )));
        }
        self.extra.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A stored memory. Immutable once written.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub text: String,
    pub metadata: Metadata,
}

/// A query result: a record and its cosine distance to the query vector.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub record: MemoryRecord,
    /// `1 - cosine_similarity`; 0.0 is an exact match, 2.0 the opposite vector.
    pub distance: f64,
}

impl SearchHit {
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }
}

/// Result of storing a memory.
#[derive(Debug, Clone, Serialize)]
pub struct StoreOutcome {
    /// Generated record id.
    pub id: String,
    /// Collection size after the insert.
    pub total: usize,
    /// Daily log file the entry was appended to, if daily logs are on.
    pub log_path: Option<PathBuf>,
}
