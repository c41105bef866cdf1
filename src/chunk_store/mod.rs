//! Transcript chunk storage and similarity search.
//!
//! [`ChunkStore`] owns the embedding step and the room-scoped similarity
//! search. Persistence is delegated to a [`VectorStore`] backend (in-memory or
//! SQLite); both backends rank through [`rank`], so ordering is identical
//! regardless of where the chunks live.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::embedding::{embed_batch_validated, embed_validated, Embedder};
use crate::error::{LecternError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// An embedded transcript fragment. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptChunk {
    /// Unique chunk ID.
    pub id: Uuid,
    /// Room this chunk belongs to.
    pub room_id: Uuid,
    /// Transcript text.
    pub text: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this chunk was stored.
    pub created_at: DateTime<Utc>,
}

impl TranscriptChunk {
    /// Create a new chunk with a fresh ID.
    pub fn new(room_id: Uuid, text: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_id,
            text,
            embedding,
            created_at: Utc::now(),
        }
    }
}

/// A chunk matched by a search, with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: Uuid,
    pub text: String,
    /// Cosine similarity (higher is better).
    pub similarity: f32,
}

/// Ranked search output: descending similarity, at most `k` entries, all
/// strictly above the relevance floor.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub entries: Vec<ScoredChunk>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Texts in rank order.
    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScoredChunk> {
        self.entries.iter()
    }
}

/// Storage backend for transcript chunks.
///
/// Backends are append-only: chunks are never updated, only removed together
/// with their room.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store a single chunk.
    async fn append(&self, chunk: &TranscriptChunk) -> Result<()>;

    /// Store several chunks in one all-or-nothing write.
    async fn append_batch(&self, chunks: &[TranscriptChunk]) -> Result<usize>;

    /// All chunks of a room, in insertion order.
    async fn chunks_for_room(&self, room_id: Uuid) -> Result<Vec<TranscriptChunk>>;

    /// Rank the room's chunks against a query embedding.
    async fn search(
        &self,
        room_id: Uuid,
        query_embedding: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<RetrievalResult>;

    /// Delete every chunk of a room.
    async fn delete_room(&self, room_id: Uuid) -> Result<usize>;

    /// Number of chunks stored for a room.
    async fn chunk_count(&self, room_id: Uuid) -> Result<usize>;
}

/// Compute cosine similarity between two vectors (`1 - cosine_distance`).
///
/// Returns 0.0 when either vector has zero magnitude or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Score `candidates` (given in insertion order) against `query`, keep those
/// strictly above `min_similarity`, and return the best `k`.
///
/// The sort is stable, so equal scores keep insertion order.
pub fn rank<'a, I>(query: &[f32], candidates: I, k: usize, min_similarity: f32) -> RetrievalResult
where
    I: IntoIterator<Item = &'a TranscriptChunk>,
{
    let mut entries: Vec<ScoredChunk> = candidates
        .into_iter()
        .map(|chunk| ScoredChunk {
            chunk_id: chunk.id,
            text: chunk.text.clone(),
            similarity: cosine_similarity(query, &chunk.embedding),
        })
        .filter(|entry| entry.similarity > min_similarity)
        .collect();

    entries.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    entries.truncate(k);

    RetrievalResult { entries }
}

/// Room-scoped transcript chunk store.
///
/// Embeds text on insert and answers similarity searches. Clones share the
/// same embedder and backend.
#[derive(Clone)]
pub struct ChunkStore {
    embedder: Arc<dyn Embedder>,
    backend: Arc<dyn VectorStore>,
}

impl ChunkStore {
    /// Create a chunk store over an embedder and a backend.
    pub fn new(embedder: Arc<dyn Embedder>, backend: Arc<dyn VectorStore>) -> Self {
        Self { embedder, backend }
    }

    /// Dimensionality every stored embedding has.
    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }

    /// The embedder used for inserts.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Embed `text` and store it under `room_id`.
    ///
    /// Nothing is written when embedding fails.
    #[instrument(skip(self, text), fields(room_id = %room_id, len = text.len()))]
    pub async fn insert(&self, room_id: Uuid, text: &str) -> Result<TranscriptChunk> {
        let embedding = embed_validated(self.embedder.as_ref(), text).await?;
        let chunk = TranscriptChunk::new(room_id, text.to_string(), embedding);
        self.backend.append(&chunk).await?;
        debug!("Stored chunk {}", chunk.id);
        Ok(chunk)
    }

    /// Embed every text, then store them all in one write.
    ///
    /// Either all chunks are stored or none are.
    #[instrument(skip(self, texts), fields(room_id = %room_id, count = texts.len()))]
    pub async fn insert_batch(&self, room_id: Uuid, texts: &[String]) -> Result<Vec<TranscriptChunk>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = embed_batch_validated(self.embedder.as_ref(), texts).await?;
        let chunks: Vec<TranscriptChunk> = texts
            .iter()
            .zip(embeddings)
            .map(|(text, embedding)| TranscriptChunk::new(room_id, text.clone(), embedding))
            .collect();

        self.backend.append_batch(&chunks).await?;
        info!("Stored {} chunks for room {}", chunks.len(), room_id);
        Ok(chunks)
    }

    /// Rank the room's chunks against `query_embedding`.
    ///
    /// Only chunks of `room_id` are considered. Returns an empty result when
    /// the room has no chunks.
    #[instrument(skip(self, query_embedding), fields(room_id = %room_id))]
    pub async fn search(
        &self,
        room_id: Uuid,
        query_embedding: &[f32],
        k: usize,
        min_similarity: f32,
    ) -> Result<RetrievalResult> {
        if query_embedding.len() != self.dimensions() {
            return Err(LecternError::DimensionMismatch {
                expected: self.dimensions(),
                actual: query_embedding.len(),
            });
        }
        if k == 0 {
            return Ok(RetrievalResult::default());
        }

        let result = self
            .backend
            .search(room_id, query_embedding, k, min_similarity)
            .await?;
        debug!("Search matched {} chunks", result.len());
        Ok(result)
    }

    /// All chunks of a room, in insertion order.
    pub async fn chunks_for_room(&self, room_id: Uuid) -> Result<Vec<TranscriptChunk>> {
        self.backend.chunks_for_room(room_id).await
    }

    /// Number of chunks stored for a room.
    pub async fn chunk_count(&self, room_id: Uuid) -> Result<usize> {
        self.backend.chunk_count(room_id).await
    }

    /// Remove every chunk of a room.
    pub async fn delete_room(&self, room_id: Uuid) -> Result<usize> {
        self.backend.delete_room(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{at_similarity, FailingEmbedder, StaticEmbedder};

    fn chunk(room_id: Uuid, text: &str, embedding: Vec<f32>) -> TranscriptChunk {
        TranscriptChunk::new(room_id, text.to_string(), embedding)
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_rank_floor_is_strict() {
        let room = Uuid::new_v4();
        let query = vec![1.0, 0.0];
        let orthogonal = chunk(room, "orthogonal", vec![0.0, 1.0]);
        let above = chunk(room, "above", at_similarity(0.5));

        let result = rank(&query, [&orthogonal, &above], 10, 0.0);
        assert_eq!(result.texts(), vec!["above".to_string()]);

        let exact = cosine_similarity(&query, &above.embedding);
        let result = rank(&query, [&orthogonal, &above], 10, exact);
        assert!(result.is_empty());
    }

    #[test]
    fn test_rank_orders_descending_and_truncates() {
        let room = Uuid::new_v4();
        let query = vec![1.0, 0.0];
        let low = chunk(room, "low", at_similarity(0.2));
        let high = chunk(room, "high", at_similarity(0.9));
        let mid = chunk(room, "mid", at_similarity(0.5));

        let result = rank(&query, [&low, &high, &mid], 2, 0.1);
        assert_eq!(result.texts(), vec!["high".to_string(), "mid".to_string()]);
        assert!(result.entries[0].similarity > result.entries[1].similarity);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        let room = Uuid::new_v4();
        let query = vec![1.0, 0.0];
        let first = chunk(room, "first", at_similarity(0.7));
        let second = chunk(room, "second", at_similarity(0.7));
        let third = chunk(room, "third", at_similarity(0.7));

        let result = rank(&query, [&first, &second, &third], 3, 0.1);
        assert_eq!(
            result.texts(),
            vec!["first".to_string(), "second".to_string(), "third".to_string()]
        );
    }

    #[tokio::test]
    async fn test_insert_embeds_and_stores() {
        let embedder = Arc::new(StaticEmbedder::new(2).with("hello", vec![1.0, 0.0]));
        let store = ChunkStore::new(embedder.clone(), Arc::new(MemoryVectorStore::new()));
        let room = Uuid::new_v4();

        let stored = store.insert(room, "hello").await.unwrap();
        assert_eq!(stored.embedding, vec![1.0, 0.0]);
        assert_eq!(stored.room_id, room);
        assert_eq!(store.chunk_count(room).await.unwrap(), 1);
        assert_eq!(embedder.calls(), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_writes_nothing() {
        let store = ChunkStore::new(
            Arc::new(FailingEmbedder::new(2)),
            Arc::new(MemoryVectorStore::new()),
        );
        let room = Uuid::new_v4();

        let err = store.insert(room, "hello").await.unwrap_err();
        assert!(matches!(err, LecternError::EmbeddingUnavailable(_)));
        assert_eq!(store.chunk_count(room).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_batch_is_all_or_nothing() {
        let embedder = Arc::new(
            StaticEmbedder::new(2)
                .with("ok", vec![1.0, 0.0])
                .with("broken", vec![1.0]),
        );
        let store = ChunkStore::new(embedder, Arc::new(MemoryVectorStore::new()));
        let room = Uuid::new_v4();

        let err = store
            .insert_batch(room, &["ok".to_string(), "broken".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, LecternError::EmbeddingUnavailable(_)));
        assert_eq!(store.chunk_count(room).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_query_dimensions() {
        let store = ChunkStore::new(
            Arc::new(StaticEmbedder::new(3)),
            Arc::new(MemoryVectorStore::new()),
        );
        let err = store
            .search(Uuid::new_v4(), &[1.0, 0.0], 3, 0.1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LecternError::DimensionMismatch { expected: 3, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn test_search_empty_room_is_not_an_error() {
        let store = ChunkStore::new(
            Arc::new(StaticEmbedder::new(2)),
            Arc::new(MemoryVectorStore::new()),
        );
        let result = store.search(Uuid::new_v4(), &[1.0, 0.0], 3, 0.1).await.unwrap();
        assert!(result.is_empty());
    }

    async fn assert_repeated_search_is_stable(backend: Arc<dyn VectorStore>) {
        let embedder = Arc::new(
            StaticEmbedder::new(2)
                .with("tie one", at_similarity(0.7))
                .with("below floor", at_similarity(0.05))
                .with("best", at_similarity(0.9))
                .with("tie two", at_similarity(0.7))
                .with("weak", at_similarity(0.3)),
        );
        let store = ChunkStore::new(embedder, backend);
        let room = Uuid::new_v4();
        let texts: Vec<String> = ["tie one", "below floor", "best", "tie two", "weak"]
            .iter()
            .map(|t| t.to_string())
            .collect();
        store.insert_batch(room, &texts).await.unwrap();

        let first = store.search(room, &[1.0, 0.0], 4, 0.1).await.unwrap();
        assert_eq!(
            first.texts(),
            vec![
                "best".to_string(),
                "tie one".to_string(),
                "tie two".to_string(),
                "weak".to_string()
            ]
        );
        for _ in 0..5 {
            assert_eq!(store.search(room, &[1.0, 0.0], 4, 0.1).await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_repeated_search_is_stable_in_memory() {
        assert_repeated_search_is_stable(Arc::new(MemoryVectorStore::new())).await;
    }

    #[tokio::test]
    async fn test_repeated_search_is_stable_in_sqlite() {
        assert_repeated_search_is_stable(Arc::new(SqliteVectorStore::in_memory().unwrap())).await;
    }
}
