//! eternal-memory - Persistent semantic memory for AI agents.
//!
//! Stores free-text memories as embedding vectors in a local SQLite store,
//! retrieves them by cosine similarity, and keeps a human-readable markdown
//! log per day. All operations are synchronous (no async/await required).
//!
//! # Example
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use eternal_memory::{Config, MemoryStore, OnnxEmbedder, Workspace};
//!
//! let workspace = Workspace::resolve(None).expect("resolve workspace");
//! let config = Config::load(&workspace).expect("run setup first");
//!
//! let embedder = OnnxEmbedder::new(&config.embeddings.model, config.embeddings.cache_dir.clone());
//! let mut store = MemoryStore::open(&config, &workspace, embedder).expect("open store");
//!
//! let outcome = store
//!     .store("User prefers dark mode", "manual", &BTreeMap::new())
//!     .expect("store memory");
//! println!("Stored {} ({} total)", outcome.id, outcome.total);
//!
//! for hit in store.search("preferences about UI", 5).expect("search") {
//!     println!("{:.0}%: {}", hit.similarity() * 100.0, hit.record.text);
//! }
//! ```
//!
//! # Mutability Requirements
//!
//! `MemoryStore::store` and `MemoryStore::search` require `&mut self` because
//! the embedding engine loads the model lazily and mutates ONNX session state.

pub mod config;
pub mod daily_log;
pub mod embedding;
pub mod errors;
pub mod id_gen;
pub mod logging;
pub mod memory;
pub mod memory_types;
pub mod sqlite;

// Re-export public API
pub use config::{Config, ConfigStore, Workspace};
pub use daily_log::{DailyLog, LogEntry};
pub use embedding::{Embedder, OnnxEmbedder};
pub use errors::Error;
pub use memory::MemoryStore;
pub use memory::store::{MAX_INPUT_LENGTH, MAX_SEARCH_LIMIT};
pub use memory_types::{MemoryRecord, Metadata, SOURCE_MANUAL, SearchHit, StoreOutcome};
pub use sqlite::VectorStore;
