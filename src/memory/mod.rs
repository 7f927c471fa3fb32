//! Core memory store orchestrating embedding, persistence and daily logs.
//!
//! Provides the `store`/`search`/`count` operations behind the CLI, generic
//! over the [`Embedder`](crate::embedding::Embedder) so tests can run without
//! the ONNX model.

mod crud;
mod search;

// pub(crate): module internals hidden; public items re-exported explicitly via lib.rs
pub(crate) mod store;

pub use store::MemoryStore;
