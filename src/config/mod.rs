//! Configuration module for Lectern.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AnswerPrompts, Prompts, TranscriptionPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, GenerationSettings, OpenAISettings,
    PromptSettings, RetrievalSettings, ServerSettings, Settings, StorageProvider, StorageSettings,
    TranscriptionSettings,
};
