//! SQLite-based vector store implementation.
//!
//! Embeddings are stored as little-endian f32 blobs and similarity is
//! computed in Rust. Insertion order is recorded by an autoincrement `seq`
//! column so equal scores rank deterministically.

use super::{rank, RetrievalResult, TranscriptChunk, VectorStore};
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        room_id TEXT NOT NULL,
        text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        dimensions INTEGER NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_room_seq ON chunks(room_id, seq);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

/// A row as read from the `chunks` table, before decoding.
struct ChunkRow {
    id: String,
    room_id: String,
    text: String,
    embedding: Vec<u8>,
    dimensions: i64,
    created_at: String,
}

impl SqliteVectorStore {
    /// Open (or create) a vector store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode so the record store can share the file
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn insert_row(conn: &Connection, chunk: &TranscriptChunk) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO chunks (id, room_id, text, embedding, dimensions, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                chunk.id.to_string(),
                chunk.room_id.to_string(),
                chunk.text,
                Self::embedding_to_bytes(&chunk.embedding),
                chunk.embedding.len() as i64,
                chunk.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Load the room's chunks in insertion order.
    fn load_room(conn: &Connection, room_id: Uuid) -> Result<Vec<TranscriptChunk>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT id, room_id, text, embedding, dimensions, created_at
            FROM chunks
            WHERE room_id = ?1
            ORDER BY seq
            "#,
        )?;

        let rows = stmt.query_map(params![room_id.to_string()], |row| {
            Ok(ChunkRow {
                id: row.get(0)?,
                room_id: row.get(1)?,
                text: row.get(2)?,
                embedding: row.get(3)?,
                dimensions: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let chunks = rows
            .map(|row| -> Result<TranscriptChunk> { Self::decode(row?) })
            .collect::<Result<Vec<_>>>()?;
        Ok(chunks)
    }

    fn decode(row: ChunkRow) -> Result<TranscriptChunk> {
        let embedding = Self::bytes_to_embedding(&row.embedding);
        if row.embedding.len() % 4 != 0 || embedding.len() as i64 != row.dimensions {
            return Err(LecternError::Store(format!(
                "Chunk {} has a corrupt embedding ({} bytes, {} dimensions recorded)",
                row.id,
                row.embedding.len(),
                row.dimensions
            )));
        }

        Ok(TranscriptChunk {
            id: parse_uuid(&row.id)?,
            room_id: parse_uuid(&row.room_id)?,
            text: row.text,
            embedding,
            created_at: parse_time(&row.created_at)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| LecternError::Store(format!("Invalid id '{}': {}", s, e)))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LecternError::Store(format!("Invalid timestamp '{}': {}", s, e)))
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, chunk), fields(chunk_id = %chunk.id))]
    async fn append(&self, chunk: &TranscriptChunk) -> Result<()> {
        let conn = self.lock()?;
        Self::insert_row(&conn, chunk)?;
        debug!("Appended chunk {}", chunk.id);
        Ok(())
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn append_batch(&self, chunks: &[TranscriptChunk]) -> Result<usize> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            Self::insert_row(&tx, chunk)?;
        }

        tx.commit()?;
        info!("Batch appended {} chunks", chunks.len());
        Ok(chunks.len())
    }

    async fn chunks_for_room(&self, room_id: Uuid) -> Result<Vec<TranscriptChunk>> {
        let conn = self.lock()?;
        Self::load_room(&conn, room_id)
    }

    #[instrument(skip(self, query_embedding), fields(room_id = %room_id))]
    async fn search(
        &self,
        room_id: Uuid,
        query_embedding: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<RetrievalResult> {
        let chunks = {
            let conn = self.lock()?;
            Self::load_room(&conn, room_id)?
        };

        let result = rank(query_embedding, &chunks, k, min_similarity);
        debug!("Found {} matching chunks out of {}", result.len(), chunks.len());
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: Uuid) -> Result<usize> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM chunks WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;

        info!("Deleted {} chunks for room {}", deleted, room_id);
        Ok(deleted)
    }

    async fn chunk_count(&self, room_id: Uuid) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE room_id = ?1",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
