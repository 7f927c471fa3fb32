//! SQLite-backed vector store.
//!
//! This module provides:
//! - `VectorStore`: one collection of memory records per store directory
//! - `embedding`: BLOB conversion and cosine distance
//! - `search`: exact nearest-neighbour query
//!
//! The collection records the embedding model that created it and the
//! dimensionality of its vectors; every later insert and query is checked
//! against both.

pub mod embedding;
pub mod search;

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::{Path, PathBuf};

use crate::errors::Error;
use crate::memory_types::{MemoryRecord, Metadata};

use self::embedding::{validate_vector, vec_to_blob};

/// Database file inside the store directory.
pub const DB_FILE: &str = "memories.db";
/// Name of the single collection held by a store.
pub const COLLECTION_NAME: &str = "eternal_memories";
/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

const META_NAME: &str = "name";
const META_MODEL: &str = "model_id";
const META_DIMENSIONS: &str = "dimensions";
const META_CREATED_AT: &str = "created_at";

/// Handle on a persistent vector collection.
///
/// Opened at command start and released when dropped (or via [`close`]).
///
/// [`close`]: VectorStore::close
pub struct VectorStore {
    conn: Connection,
    path: PathBuf,
}

/// Initialize database schema.
fn create_schema(conn: &Connection) -> Result<(), Error> {
    conn.execute_batch(&format!(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA busy_timeout = {BUSY_TIMEOUT_MS};

        CREATE TABLE IF NOT EXISTS memories (
            id TEXT PRIMARY KEY,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS collection_meta (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        "#
    ))?;
    Ok(())
}

impl VectorStore {
    /// Open or create the store in `dir` for vectors produced by `model_id`.
    ///
    /// Creates the directory and schema if needed. A collection created with
    /// another model is rejected unless it is still empty, in which case it
    /// adopts `model_id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ModelMismatch` if the collection holds vectors from a
    /// different model, or an I/O/SQLite error if the database cannot be opened.
    pub fn open(dir: &Path, model_id: &str) -> Result<Self, Error> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(DB_FILE);
        let conn = Connection::open(&path)?;
        create_schema(&conn)?;

        let store = Self { conn, path };
        store.bind_model(model_id)?;

        tracing::debug!(path = %store.path.display(), model = model_id, "Vector store opened");
        Ok(store)
    }

    /// Open an existing store without binding it to a model.
    ///
    /// Returns `None` when `dir` holds no database; nothing is created on disk
    /// in that case. The recorded model is left as found.
    pub fn open_existing(dir: &Path) -> Result<Option<Self>, Error> {
        let path = dir.join(DB_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&path, flags)?;
        create_schema(&conn)?;

        tracing::debug!(path = %path.display(), "Vector store opened unbound");
        Ok(Some(Self { conn, path }))
    }

    fn bind_model(&self, model_id: &str) -> Result<(), Error> {
        match self.meta(META_MODEL)? {
            None => {
                self.set_meta(META_NAME, COLLECTION_NAME)?;
                self.set_meta(META_MODEL, model_id)?;
                self.set_meta(META_CREATED_AT, &Utc::now().to_rfc3339())?;
            }
            Some(stored) if stored == model_id => {}
            Some(stored) => {
                if self.count()? > 0 {
                    return Err(Error::ModelMismatch {
                        stored,
                        configured: model_id.to_string(),
                    });
                }
                tracing::info!(
                    from = %stored,
                    to = model_id,
                    "Empty collection adopting new embedding model"
                );
                self.set_meta(META_MODEL, model_id)?;
                self.conn.execute(
                    "DELETE FROM collection_meta WHERE key = ?1",
                    [META_DIMENSIONS],
                )?;
            }
        }
        Ok(())
    }

    fn meta(&self, key: &str) -> Result<Option<String>, Error> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM collection_meta WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<(), Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO collection_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Path of the SQLite database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embedding model the collection is bound to.
    pub fn model_id(&self) -> Result<Option<String>, Error> {
        self.meta(META_MODEL)
    }

    /// Vector dimensionality, fixed by the first insert.
    pub fn dimensions(&self) -> Result<Option<usize>, Error> {
        match self.meta(META_DIMENSIONS)? {
            Some(value) => value.parse().map(Some).map_err(|e| Error::CorruptRecord {
                id: META_DIMENSIONS.to_string(),
                reason: format!("invalid dimensions value '{value}': {e}"),
            }),
            None => Ok(None),
        }
    }

    /// Number of records in the collection.
    pub fn count(&self) -> Result<usize, Error> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM memories", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateId` if `id` is already stored
    /// - `Error::DimensionMismatch` if `vector` differs in length from the collection
    /// - `Error::InvalidInput` for empty or non-finite vectors
    pub fn add(
        &self,
        id: &str,
        vector: &[f32],
        text: &str,
        metadata: &Metadata,
    ) -> Result<(), Error> {
        validate_vector(vector)?;
        let metadata_json = serde_json::to_string(metadata)?;
        let blob = vec_to_blob(vector);

        let tx = self.conn.unchecked_transaction()?;

        match self.dimensions()? {
            Some(expected) if expected != vector.len() => {
                return Err(Error::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            Some(_) => {}
            None => self.set_meta(META_DIMENSIONS, &vector.len().to_string())?,
        }

        let rows = tx.execute(
            r#"
            INSERT OR IGNORE INTO memories (id, text, embedding, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![id, text, &blob, &metadata_json, &metadata.timestamp],
        )?;

        if rows == 0 {
            return Err(Error::DuplicateId(id.to_string()));
        }

        tx.commit()?;
        tracing::debug!(id, dims = vector.len(), "Record added");
        Ok(())
    }

    /// Retrieve a single record by id.
    pub fn get(&self, id: &str) -> Result<Option<MemoryRecord>, Error> {
        let row = self
            .conn
            .query_row(
                "SELECT id, text, embedding, metadata FROM memories WHERE id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, text, blob, metadata)) => {
                let dims = blob.len() / 4;
                Ok(Some(decode_record(id, text, &blob, &metadata, dims)?))
            }
            None => Ok(None),
        }
    }

    /// Close the connection, surfacing any error SQLite reports on shutdown.
    pub fn close(self) -> Result<(), Error> {
        self.conn.close().map_err(|(_, e)| Error::SQLite(e))
    }
}

/// Rebuild a record from its stored columns.
pub(crate) fn decode_record(
    id: String,
    text: String,
    blob: &[u8],
    metadata: &str,
    dims: usize,
) -> Result<MemoryRecord, Error> {
    let vector = embedding::blob_to_vec(&id, blob, dims)?;
    let metadata: Metadata = serde_json::from_str(metadata).map_err(|e| Error::CorruptRecord {
        id: id.clone(),
        reason: format!("invalid metadata: {e}"),
    })?;
    Ok(MemoryRecord {
        id,
        vector,
        text,
        metadata,
    })
}
