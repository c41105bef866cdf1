//! RAG (Retrieval-Augmented Generation) for answering questions about a room's lectures.
//!
//! The [`Retriever`] finds relevant transcript chunks; the
//! [`AnswerSynthesizer`] turns them into an answer grounded in that text.

pub mod retriever;
pub mod synthesizer;

pub use retriever::Retriever;
pub use synthesizer::AnswerSynthesizer;
