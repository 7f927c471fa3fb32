//! Exact nearest-neighbour query over the collection.

use std::cmp::Ordering;

use super::{Error, VectorStore, decode_record, embedding};
use crate::memory_types::SearchHit;

pub type Result<T> = std::result::Result<T, Error>;

pub const MAX_SEARCH_LIMIT: usize = 10_000;

/// Validate search limit is within acceptable bounds.
pub fn validate_limit(limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Error::InvalidInput(
            "Limit must be greater than 0".to_string(),
        ));
    }
    if limit > MAX_SEARCH_LIMIT {
        return Err(Error::InvalidInput(format!(
            "Limit {} exceeds maximum allowed ({})",
            limit, MAX_SEARCH_LIMIT
        )));
    }
    Ok(())
}

impl VectorStore {
    /// Return the `k` records closest to `vector` by cosine distance.
    ///
    /// Scans every record, so results are exact. Hits are sorted by ascending
    /// distance; ties keep insertion order. Returns fewer than `k` hits when
    /// the collection is smaller, and an empty list when it is empty.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if `k` is out of range or `vector` is invalid
    /// - `Error::DimensionMismatch` if `vector` does not match the collection
    pub fn query(&self, vector: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        validate_limit(k)?;
        embedding::validate_vector(vector)?;

        let dims = match self.dimensions()? {
            Some(dims) => dims,
            None => return Ok(Vec::new()),
        };
        if dims != vector.len() {
            return Err(Error::DimensionMismatch {
                expected: dims,
                actual: vector.len(),
            });
        }

        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, text, embedding, metadata
            FROM memories
            ORDER BY rowid
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut hits = Vec::new();
        for row_result in rows {
            let (id, text, blob, metadata) = row_result?;
            let record = decode_record(id, text, &blob, &metadata, dims)?;
            let distance = embedding::cosine_distance(vector, &record.vector)?;
            hits.push(SearchHit { record, distance });
        }

        // stable sort keeps rowid order among equal distances
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal));
        hits.truncate(k);

        tracing::debug!(k, returned = hits.len(), "Query complete");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_types::{Metadata, SOURCE_MANUAL};
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, VectorStore) {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "test/model").unwrap();
        (dir, store)
    }

    fn add(store: &VectorStore, id: &str, vector: &[f32]) {
        store
            .add(id, vector, &format!("text for {id}"), &Metadata::now(SOURCE_MANUAL))
            .unwrap();
    }

    #[test]
    fn test_validate_limit_zero() {
        assert!(matches!(validate_limit(0), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_validate_limit_too_large() {
        assert!(validate_limit(MAX_SEARCH_LIMIT + 1).is_err());
    }

    #[test]
    fn test_validate_limit_valid() {
        assert!(validate_limit(1).is_ok());
        assert!(validate_limit(5000).is_ok());
        assert!(validate_limit(MAX_SEARCH_LIMIT).is_ok());
    }

    #[test]
    fn test_query_empty_collection() {
        let (_dir, store) = create_test_store();
        let hits = store.query(&[1.0, 0.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_query_self_match_first() {
        let (_dir, store) = create_test_store();
        add(&store, "a", &[1.0, 0.0, 0.0]);
        add(&store, "b", &[0.0, 1.0, 0.0]);
        add(&store, "c", &[0.7, 0.7, 0.0]);

        let hits = store.query(&[0.0, 1.0, 0.0], 3).unwrap();
        assert_eq!(hits[0].record.id, "b");
        assert!(hits[0].distance.abs() < 1e-6);
        assert_eq!(hits[1].record.id, "c");
        assert_eq!(hits[2].record.id, "a");
    }

    #[test]
    fn test_query_sorted_ascending() {
        let (_dir, store) = create_test_store();
        for i in 0..10 {
            let angle = i as f32 * 0.15;
            add(&store, &format!("m{i}"), &[angle.cos(), angle.sin()]);
        }

        let hits = store.query(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 10);
        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_query_k_larger_than_collection() {
        let (_dir, store) = create_test_store();
        add(&store, "a", &[1.0, 0.0]);
        add(&store, "b", &[0.0, 1.0]);

        let hits = store.query(&[1.0, 1.0], 5).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_query_limit_truncates() {
        let (_dir, store) = create_test_store();
        for i in 0..5 {
            add(&store, &format!("m{i}"), &[1.0, i as f32]);
        }

        let hits = store.query(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].record.id, "m0");
    }

    #[test]
    fn test_query_ties_keep_insertion_order() {
        let (_dir, store) = create_test_store();
        add(&store, "first", &[1.0, 0.0]);
        add(&store, "second", &[2.0, 0.0]);
        add(&store, "third", &[3.0, 0.0]);

        let hits = store.query(&[1.0, 0.0], 3).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.record.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let (_dir, store) = create_test_store();
        add(&store, "a", &[1.0, 0.0, 0.0]);

        assert!(matches!(
            store.query(&[1.0, 0.0], 1),
            Err(Error::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_query_invalid_k() {
        let (_dir, store) = create_test_store();
        add(&store, "a", &[1.0, 0.0]);
        assert!(matches!(
            store.query(&[1.0, 0.0], 0),
            Err(Error::InvalidInput(_))
        ));
    }
}
