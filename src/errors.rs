//! Error types for eternal-memory.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for eternal-memory operations.
#[derive(Error, Debug)]
pub enum Error {
    /// No configuration file exists yet.
    #[error("Memory system not initialized: no configuration at {0}")]
    NotInitialized(PathBuf),

    /// The embedding model could not be fetched or loaded.
    #[error("Embedding model '{model}' unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    /// A record with this id already exists in the collection.
    #[error("Duplicate memory id: {0}")]
    DuplicateId(String),

    /// Vector length does not match the collection's dimensionality.
    #[error("Dimension mismatch: collection holds {expected}-dimensional vectors, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The store was populated by a different embedding model.
    #[error(
        "Embedding model mismatch: store holds '{stored}' vectors, '{configured}' is configured"
    )]
    ModelMismatch { stored: String, configured: String },

    /// A stored row could not be decoded.
    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Empty or whitespace-only text.
    #[error("Input cannot be empty")]
    EmptyInput,

    /// Text longer than the accepted maximum.
    #[error("Input too long: {actual_length} bytes (maximum {max_length})")]
    InputTooLong {
        max_length: usize,
        actual_length: usize,
    },

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite error.
    #[error("SQLite error: {0}")]
    SQLite(#[from] rusqlite::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// ONNX inference error.
    #[error("Inference error: {0}")]
    Inference(String),

    /// Tokenization error.
    #[error("Tokenization error: {0}")]
    Tokenization(#[from] tokenizers::Error),

    /// ONNX session error.
    #[error("ONNX session error: {0}")]
    Onnx(#[from] ort::Error),
}

impl Error {
    /// Short remediation hint shown by the CLI under the error message.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::NotInitialized(_) => Some("run 'eternal-memory setup' first"),
            Error::ModelUnavailable { .. } => {
                Some("check network access to the HuggingFace hub or the configured model id")
            }
            Error::ModelMismatch { .. } => Some(
                "restore the original embeddings.model or point storage.local.path at a new store",
            ),
            _ => None,
        }
    }
}
