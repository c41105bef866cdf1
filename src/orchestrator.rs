//! Pipeline orchestrator for Lectern.
//!
//! Coordinates ingestion (audio to indexed chunks) and question answering
//! (retrieval, synthesis, persistence) for a room.

use crate::chunk_store::{ChunkStore, MemoryVectorStore, ScoredChunk, SqliteVectorStore, VectorStore};
use crate::chunking::ParagraphChunker;
use crate::config::{Prompts, Settings, StorageProvider};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{LecternError, Result};
use crate::generation::{Generator, OpenAIGenerator};
use crate::input::QuestionText;
use crate::rag::{AnswerSynthesizer, Retriever};
use crate::records::{MemoryRecordStore, RecordStore, Room, SqliteRecordStore};
use crate::transcription::{extension_for_mime, Transcriber, WhisperTranscriber};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The answer to one question, as persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredQuestion {
    pub question_id: Uuid,
    /// `None` when no transcript chunk was relevant enough.
    pub answer: Option<String>,
    /// Chunks the answer was grounded on, best first.
    #[serde(skip)]
    pub sources: Vec<ScoredChunk>,
}

/// Result of ingesting audio or a transcript.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub room_id: Uuid,
    pub chunk_ids: Vec<Uuid>,
    /// Characters in the transcript.
    pub characters: usize,
}

/// The main orchestrator for the Lectern pipeline.
pub struct Orchestrator {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    chunker: ParagraphChunker,
    chunk_store: ChunkStore,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    records: Arc<dyn RecordStore>,
}

impl Orchestrator {
    /// Create a new orchestrator backed by OpenAI and the configured storage.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::from_settings(
            &settings.transcription,
            &settings.openai,
            &prompts.transcription.hint,
        )?);
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(
            &settings.embedding,
            &settings.openai,
        )?);
        let generator: Arc<dyn Generator> = Arc::new(OpenAIGenerator::from_settings(
            &settings.generation,
            &settings.openai,
        )?);

        let (vector_store, records): (Arc<dyn VectorStore>, Arc<dyn RecordStore>) =
            match settings.storage.provider {
                StorageProvider::Sqlite => {
                    let path = settings.sqlite_path();
                    info!("Using SQLite storage at {:?}", path);
                    (
                        Arc::new(SqliteVectorStore::new(&path)?),
                        Arc::new(SqliteRecordStore::new(&path)?),
                    )
                }
                StorageProvider::Memory => {
                    info!("Using in-memory storage; nothing will persist");
                    (
                        Arc::new(MemoryVectorStore::new()),
                        Arc::new(MemoryRecordStore::new()),
                    )
                }
            };

        Ok(Self::with_components(
            settings,
            prompts,
            transcriber,
            embedder,
            generator,
            vector_store,
            records,
        ))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        transcriber: Arc<dyn Transcriber>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        vector_store: Arc<dyn VectorStore>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let chunk_store = ChunkStore::new(embedder, vector_store);
        let retriever = Retriever::from_settings(chunk_store.clone(), &settings.retrieval);
        let synthesizer = AnswerSynthesizer::new(generator).with_prompts(prompts);
        let chunker = ParagraphChunker::from_settings(&settings.chunking);

        Self {
            settings,
            transcriber,
            chunker,
            chunk_store,
            retriever,
            synthesizer,
            records,
        }
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get a reference to the record store.
    pub fn records(&self) -> Arc<dyn RecordStore> {
        self.records.clone()
    }

    /// Get a reference to the chunk store.
    pub fn chunk_store(&self) -> &ChunkStore {
        &self.chunk_store
    }

    /// Get the configured retriever.
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Look up a room, failing with `RoomNotFound` if it does not exist.
    pub async fn require_room(&self, room_id: Uuid) -> Result<Room> {
        self.records
            .get_room(room_id)
            .await?
            .ok_or(LecternError::RoomNotFound(room_id))
    }

    /// Answer a question about a room's lectures and record it.
    ///
    /// When no chunk clears the relevance floor the answer is `None` and the
    /// generator is not called. On any failure nothing is recorded.
    #[instrument(skip(self, question), fields(room_id = %room_id))]
    pub async fn answer_question(
        &self,
        room_id: Uuid,
        question: &QuestionText,
    ) -> Result<AnsweredQuestion> {
        self.require_room(room_id).await?;

        let retrieved = self.retriever.retrieve(room_id, question.as_str()).await?;

        let answer = if retrieved.is_empty() {
            info!("No relevant context for question");
            None
        } else {
            self.synthesizer
                .synthesize(question.as_str(), &retrieved.texts())
                .await?
        };

        let stored = self
            .records
            .insert_question(room_id, question.as_str(), answer.as_deref())
            .await?;

        info!(
            "Answered question {} from {} chunks",
            stored.id,
            retrieved.len()
        );

        Ok(AnsweredQuestion {
            question_id: stored.id,
            answer,
            sources: retrieved.entries,
        })
    }

    /// Transcribe audio, chunk the transcript, and index it in the room.
    #[instrument(skip(self, audio), fields(room_id = %room_id, bytes = audio.len()))]
    pub async fn ingest_audio(
        &self,
        room_id: Uuid,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<IngestResult> {
        self.require_room(room_id).await?;
        if audio.is_empty() {
            return Err(LecternError::InvalidInput("Audio upload is empty".to_string()));
        }
        extension_for_mime(mime_type)?;

        info!("Transcribing {} bytes of {}", audio.len(), mime_type);
        let transcript = self.transcriber.transcribe(audio, mime_type).await?;

        self.index(room_id, &transcript).await
    }

    /// Chunk an existing transcript and index it in the room.
    #[instrument(skip(self, transcript), fields(room_id = %room_id))]
    pub async fn ingest_transcript(&self, room_id: Uuid, transcript: &str) -> Result<IngestResult> {
        self.require_room(room_id).await?;
        self.index(room_id, transcript).await
    }

    async fn index(&self, room_id: Uuid, transcript: &str) -> Result<IngestResult> {
        let texts = self.chunker.chunk(transcript);
        if texts.is_empty() {
            return Err(LecternError::InvalidInput(
                "Transcript contains no text".to_string(),
            ));
        }

        let chunks = self.chunk_store.insert_batch(room_id, &texts).await?;

        // A concurrent delete may have removed the room since `require_room`.
        if self.records.get_room(room_id).await?.is_none() {
            warn!("Room {} was deleted during ingest, dropping its chunks", room_id);
            self.chunk_store.delete_room(room_id).await?;
            return Err(LecternError::RoomNotFound(room_id));
        }
        info!("Indexed {} chunks into room {}", chunks.len(), room_id);

        Ok(IngestResult {
            room_id,
            chunk_ids: chunks.iter().map(|c| c.id).collect(),
            characters: transcript.chars().count(),
        })
    }

    /// Delete a room with its chunks and questions.
    ///
    /// The room record goes first, so a failure part way leaves at most
    /// unreachable chunks behind. Returns false if the room did not exist.
    #[instrument(skip(self))]
    pub async fn delete_room(&self, room_id: Uuid) -> Result<bool> {
        let existed = self.records.delete_room(room_id).await?;
        let chunks = self.chunk_store.delete_room(room_id).await?;
        info!("Deleted room {} ({} chunks)", room_id, chunks);
        Ok(existed)
    }
}
