//! Create and read operations for the memory store.

use std::collections::BTreeMap;

use chrono::Local;

use crate::daily_log::{KIND_MANUAL, LogEntry};
use crate::embedding::Embedder;
use crate::errors::Error;
use crate::id_gen::memory_id;
use crate::memory_types::{MemoryRecord, Metadata, StoreOutcome};

use super::store::MemoryStore;

impl<E: Embedder> MemoryStore<E> {
    #[must_use = "handle the error or results may be lost"]
    /// Embed and persist a memory, then append it to today's daily log.
    ///
    /// Once the record is committed a daily log failure is logged and
    /// reported as `log_path: None`; the record is not rolled back.
    ///
    /// # Arguments
    ///
    /// * `text` - Memory text (non-empty, at most 100,000 bytes)
    /// * `source` - Recorded as `metadata.source`
    /// * `extra` - Additional metadata fields; `timestamp` and `source` are reserved
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Input is empty or too long
    /// - An extra metadata key is empty or reserved
    /// - Embedding generation fails
    /// - The vector store cannot be written
    pub fn store(
        &mut self,
        text: &str,
        source: &str,
        extra: &BTreeMap<String, String>,
    ) -> Result<StoreOutcome, Error> {
        Self::validate_input_length(text)?;

        let now = Local::now();
        let mut metadata = Metadata::at(source, &now);
        for (key, value) in extra {
            metadata.insert_extra(key, value)?;
        }

        let vector = self.embedder.embed(text)?;
        let id = memory_id();
        self.vectors.add(&id, &vector, text, &metadata)?;
        let total = self.vectors.count()?;

        let log_path = match &self.daily_log {
            Some(log) => {
                let entry = LogEntry {
                    time: now.time(),
                    kind: KIND_MANUAL,
                    text,
                };
                match log.append(now.date_naive(), &entry) {
                    Ok(path) => Some(path),
                    Err(e) => {
                        tracing::warn!(
                            id = %id,
                            error = %e,
                            "Memory stored but daily log append failed"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        tracing::info!(id = %id, total, "Memory stored");
        Ok(StoreOutcome {
            id,
            total,
            log_path,
        })
    }

    #[must_use = "handle the error or results may be lost"]
    /// Get a specific memory by ID.
    ///
    /// Returns `None` if the memory doesn't exist.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>, Error> {
        self.vectors.get(id)
    }
}
