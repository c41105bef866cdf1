//! Text generation capability used for answer synthesis.
//!
//! The capability receives a fully built prompt; prompt construction is owned
//! by [`crate::rag::AnswerSynthesizer`].

mod openai;

pub use openai::OpenAIGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text generation backends.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
