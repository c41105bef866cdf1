//! Lectern - grounded Q&A over recorded lectures
//!
//! Transcribes lecture audio into rooms and answers questions using only the
//! transcript fragments most relevant to each question.
//!
//! # Overview
//!
//! Lectern allows you to:
//! - Organize lectures into rooms
//! - Transcribe recordings and index them as embedded transcript chunks
//! - Ask questions and get answers grounded in the room's lectures
//! - Get no answer, rather than a made-up one, when nothing relevant was said
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt templates
//! - `transcription` - Speech-to-text transcription
//! - `chunking` - Splitting transcripts into retrieval-sized pieces
//! - `embedding` - Embedding generation and validation
//! - `chunk_store` - Room-scoped chunk storage and similarity search
//! - `generation` - Text generation capability
//! - `rag` - Retrieval and grounded answer synthesis
//! - `records` - Rooms and recorded questions
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use lectern::config::Settings;
//! use lectern::input::{NewRoom, QuestionText};
//! use lectern::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let room = orchestrator
//!         .records()
//!         .create_room(&NewRoom::new("Biology 101", None)?)
//!         .await?;
//!     let audio = std::fs::read("lecture.mp3")?;
//!     orchestrator.ingest_audio(room.id, &audio, "audio/mpeg").await?;
//!
//!     let question = QuestionText::parse("What is photosynthesis?")?;
//!     let answered = orchestrator.answer_question(room.id, &question).await?;
//!     println!("{:?}", answered.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod chunk_store;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod input;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod records;
pub mod transcription;

#[cfg(test)]
mod testing;

pub use error::{LecternError, Result};
