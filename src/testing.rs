//! Test doubles for the external capabilities.

use crate::embedding::Embedder;
use crate::error::{LecternError, Result};
use crate::generation::Generator;
use crate::transcription::Transcriber;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Embedder that looks texts up in a fixed table.
///
/// Unknown texts embed to the all-zero vector.
pub struct StaticEmbedder {
    dimensions: usize,
    table: HashMap<String, Vec<f32>>,
    calls: AtomicUsize,
}

impl StaticEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            table: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, embedding: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), embedding);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, text: &str) -> Vec<f32> {
        self.table
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dimensions])
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.lookup(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| self.lookup(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embedder whose backend always times out.
pub struct FailingEmbedder {
    dimensions: usize,
}

impl FailingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(LecternError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "embedding request timed out",
        )))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(LecternError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "embedding request timed out",
        )))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Generator that records every prompt and replies with a fixed string
/// (or fails, when built with [`CountingGenerator::failing`]).
pub struct CountingGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl CountingGenerator {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for CountingGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .ok_or_else(|| LecternError::AnswerGenerationFailed("model overloaded".to_string()))
    }
}

/// Transcriber that returns a fixed transcript.
pub struct StaticTranscriber {
    text: String,
    calls: AtomicUsize,
}

impl StaticTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transcriber for StaticTranscriber {
    async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Unit vector in two dimensions whose cosine with `[1, 0]` is `similarity`.
pub fn at_similarity(similarity: f32) -> Vec<f32> {
    vec![similarity, (1.0 - similarity * similarity).sqrt()]
}
