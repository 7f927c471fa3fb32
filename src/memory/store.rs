//! Core memory store struct combining embedding generation and persistence.

use std::path::{Path, PathBuf};

use crate::config::{Config, Workspace};
use crate::daily_log::DailyLog;
use crate::embedding::{Embedder, OnnxEmbedder};
use crate::errors::Error;
use crate::sqlite::VectorStore;

/// Maximum allowed input length in bytes.
pub const MAX_INPUT_LENGTH: usize = 100_000;
pub use crate::sqlite::search::MAX_SEARCH_LIMIT;

/// Memory service: embeds text, persists records and writes the daily log.
///
/// Opened once per command and dropped at the end of it; nothing is shared
/// between invocations except the files on disk.
///
/// # Mutability Requirements
///
/// `store` and `search` take `&mut self` because [`Embedder::embed`] may
/// load the model and mutates ONNX session state.
pub struct MemoryStore<E: Embedder = OnnxEmbedder> {
    pub(crate) vectors: VectorStore,
    pub(crate) embedder: E,
    pub(crate) daily_log: Option<DailyLog>,
    store_path: PathBuf,
}

impl<E: Embedder> MemoryStore<E> {
    /// Open the vector store at `storage.local.path` for `embedder`'s model.
    ///
    /// The daily log is attached only when `auto_capture.daily_logs` is on.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelMismatch` if the store holds vectors from another
    /// model, or a storage error if it cannot be opened.
    pub fn open(config: &Config, workspace: &Workspace, embedder: E) -> Result<Self, Error> {
        let store_path = config.store_path(workspace);
        let vectors = VectorStore::open(&store_path, embedder.model_id())?;
        let daily_log = config
            .auto_capture
            .daily_logs
            .then(|| DailyLog::new(workspace.daily_log_dir()));

        Ok(Self {
            vectors,
            embedder,
            daily_log,
            store_path,
        })
    }

    /// Number of stored memories.
    pub fn count(&self) -> Result<usize, Error> {
        self.vectors.count()
    }

    /// Directory holding the vector store.
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn embedder_mut(&mut self) -> &mut E {
        &mut self.embedder
    }

    pub fn vectors(&self) -> &VectorStore {
        &self.vectors
    }

    /// Validate input length (rejects empty and whitespace-only inputs).
    pub fn validate_input_length(text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Err(Error::EmptyInput);
        }
        if text.len() > MAX_INPUT_LENGTH {
            return Err(Error::InputTooLong {
                max_length: MAX_INPUT_LENGTH,
                actual_length: text.len(),
            });
        }
        Ok(())
    }
}
