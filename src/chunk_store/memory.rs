//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{rank, RetrievalResult, TranscriptChunk, VectorStore};
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// In-memory vector store. Chunks are kept in insertion order.
pub struct MemoryVectorStore {
    chunks: RwLock<Vec<TranscriptChunk>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            chunks: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<TranscriptChunk>>> {
        self.chunks
            .read()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<TranscriptChunk>>> {
        self.chunks
            .write()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn append(&self, chunk: &TranscriptChunk) -> Result<()> {
        let mut chunks = self.write()?;
        if chunks.iter().any(|c| c.id == chunk.id) {
            return Err(LecternError::Store(format!("Chunk {} already exists", chunk.id)));
        }
        chunks.push(chunk.clone());
        Ok(())
    }

    async fn append_batch(&self, batch: &[TranscriptChunk]) -> Result<usize> {
        let mut chunks = self.write()?;
        if let Some(dup) = batch.iter().find(|b| chunks.iter().any(|c| c.id == b.id)) {
            return Err(LecternError::Store(format!("Chunk {} already exists", dup.id)));
        }
        chunks.extend_from_slice(batch);
        Ok(batch.len())
    }

    async fn chunks_for_room(&self, room_id: Uuid) -> Result<Vec<TranscriptChunk>> {
        let chunks = self.read()?;
        Ok(chunks
            .iter()
            .filter(|c| c.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn search(
        &self,
        room_id: Uuid,
        query_embedding: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<RetrievalResult> {
        let chunks = self.read()?;
        Ok(rank(
            query_embedding,
            chunks.iter().filter(|c| c.room_id == room_id),
            k,
            min_similarity,
        ))
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<usize> {
        let mut chunks = self.write()?;
        let initial_len = chunks.len();
        chunks.retain(|c| c.room_id != room_id);
        Ok(initial_len - chunks.len())
    }

    async fn chunk_count(&self, room_id: Uuid) -> Result<usize> {
        let chunks = self.read()?;
        Ok(chunks.iter().filter(|c| c.room_id == room_id).count())
    }
}
