//! Semantic search over stored memories.

use crate::embedding::Embedder;
use crate::errors::Error;
use crate::memory_types::SearchHit;
use crate::sqlite::search::validate_limit;

use super::store::MemoryStore;

impl<E: Embedder> MemoryStore<E> {
    #[must_use = "handle the error or results may be lost"]
    /// Search memories by semantic similarity.
    ///
    /// Embeds the query and returns up to `limit` hits, closest first. An
    /// empty collection returns no hits without calling the embedder.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Limit is 0 or exceeds `MAX_SEARCH_LIMIT`
    /// - Query is empty or too long
    /// - Embedding generation fails
    /// - The query vector does not match the collection's dimensionality
    pub fn search(&mut self, query: &str, limit: usize) -> Result<Vec<SearchHit>, Error> {
        validate_limit(limit)?;

        let query = query.trim();
        Self::validate_input_length(query)?;

        if self.vectors.count()? == 0 {
            tracing::debug!("Search on empty collection");
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query)?;
        self.vectors.query(&vector, limit)
    }
}
