//! Retrieval of relevant transcript chunks for a question.

use crate::chunk_store::{ChunkStore, RetrievalResult};
use crate::config::RetrievalSettings;
use crate::embedding::embed_validated;
use crate::error::Result;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Default number of chunks returned.
pub const DEFAULT_K: usize = 3;
/// Default relevance floor. Only chunks scoring strictly above it are kept.
pub const DEFAULT_MIN_SIMILARITY: f32 = 0.1;

/// Finds the chunks of a room most similar to a question.
#[derive(Clone)]
pub struct Retriever {
    chunk_store: ChunkStore,
    k: usize,
    min_similarity: f32,
}

impl Retriever {
    /// Create a retriever with the default `k` and floor.
    pub fn new(chunk_store: ChunkStore) -> Self {
        Self {
            chunk_store,
            k: DEFAULT_K,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    pub fn from_settings(chunk_store: ChunkStore, settings: &RetrievalSettings) -> Self {
        Self::new(chunk_store)
            .with_k(settings.k)
            .with_min_similarity(settings.min_similarity)
    }

    /// Set the maximum number of chunks returned.
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set the relevance floor.
    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn min_similarity(&self) -> f32 {
        self.min_similarity
    }

    /// Retrieve up to `k` chunks of `room_id` relevant to `question`.
    ///
    /// Fails with `EmbeddingUnavailable` if the question cannot be embedded.
    #[instrument(skip(self, question), fields(room_id = %room_id))]
    pub async fn retrieve(&self, room_id: Uuid, question: &str) -> Result<RetrievalResult> {
        let embedder = self.chunk_store.embedder();
        let query_embedding = embed_validated(embedder.as_ref(), question).await?;

        let result = self
            .chunk_store
            .search(room_id, &query_embedding, self.k, self.min_similarity)
            .await?;

        debug!(
            "Retrieved {} chunks (k={}, floor={})",
            result.len(),
            self.k,
            self.min_similarity
        );
        Ok(result)
    }
}
