//! Embedding generation for semantic search and retrieval.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::{LecternError, Result};
use async_trait::async_trait;

/// Trait for embedding generation.
///
/// Implementations report failures as [`LecternError::EmbeddingUnavailable`].
/// Output is treated as approximately deterministic: the same text may not
/// always yield bit-identical vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts, in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Check that a vector returned by an embedding capability is usable.
///
/// Empty vectors, vectors of the wrong length and vectors containing NaN or
/// infinity are malformed. An all-zero vector of the right length is valid.
pub fn validate_embedding(embedding: &[f32], expected_dimensions: usize) -> Result<()> {
    if embedding.is_empty() {
        return Err(LecternError::EmbeddingUnavailable(
            "Embedding capability returned an empty vector".to_string(),
        ));
    }
    if embedding.len() != expected_dimensions {
        return Err(LecternError::EmbeddingUnavailable(format!(
            "Embedding has {} components, expected {}",
            embedding.len(),
            expected_dimensions
        )));
    }
    if let Some(pos) = embedding.iter().position(|v| !v.is_finite()) {
        return Err(LecternError::EmbeddingUnavailable(format!(
            "Embedding component {} is not a finite number",
            pos
        )));
    }
    Ok(())
}

/// Embed a single text and validate the result against the embedder's dimensions.
pub async fn embed_validated(embedder: &dyn Embedder, text: &str) -> Result<Vec<f32>> {
    if text.trim().is_empty() {
        return Err(LecternError::InvalidInput(
            "Cannot embed empty text".to_string(),
        ));
    }

    let embedding = embedder.embed(text).await.map_err(as_unavailable)?;
    validate_embedding(&embedding, embedder.dimensions())?;
    Ok(embedding)
}

/// Embed several texts and validate every result.
pub async fn embed_batch_validated(
    embedder: &dyn Embedder,
    texts: &[String],
) -> Result<Vec<Vec<f32>>> {
    if texts.iter().any(|t| t.trim().is_empty()) {
        return Err(LecternError::InvalidInput(
            "Cannot embed empty text".to_string(),
        ));
    }

    let embeddings = embedder.embed_batch(texts).await.map_err(as_unavailable)?;
    if embeddings.len() != texts.len() {
        return Err(LecternError::EmbeddingUnavailable(format!(
            "Requested {} embeddings, received {}",
            texts.len(),
            embeddings.len()
        )));
    }
    for embedding in &embeddings {
        validate_embedding(embedding, embedder.dimensions())?;
    }
    Ok(embeddings)
}

/// Any failure inside an embedder surfaces as `EmbeddingUnavailable`.
fn as_unavailable(err: LecternError) -> LecternError {
    match err {
        LecternError::EmbeddingUnavailable(_) => err,
        other => LecternError::EmbeddingUnavailable(other.to_string()),
    }
}
