//! OpenAI Whisper transcription implementation.

use super::{extension_for_mime, Transcriber};
use crate::config::{OpenAISettings, TranscriptionSettings};
use crate::error::{LecternError, Result};
use crate::openai::create_client;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    language: Option<String>,
    hint: String,
}

impl WhisperTranscriber {
    /// Create a transcriber around an existing client.
    pub fn new(
        client: async_openai::Client<async_openai::config::OpenAIConfig>,
        model: &str,
        language: Option<String>,
        hint: &str,
    ) -> Self {
        Self {
            client,
            model: model.to_string(),
            language,
            hint: hint.to_string(),
        }
    }

    /// Create a transcriber from settings and the transcription prompt hint.
    pub fn from_settings(
        transcription: &TranscriptionSettings,
        openai: &OpenAISettings,
        hint: &str,
    ) -> Result<Self> {
        Ok(Self::new(
            create_client(openai)?,
            &transcription.model,
            transcription.language.clone(),
            hint,
        ))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(LecternError::InvalidInput("Audio upload is empty".to_string()));
        }

        let filename = format!("audio.{}", extension_for_mime(mime_type)?);
        debug!("Transcribing {} with {}", filename, self.model);

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(filename, audio.to_vec()))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if !self.hint.trim().is_empty() {
            request_builder.prompt(&self.hint);
        }
        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| LecternError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| LecternError::Transcription(format!("Whisper API error: {}", e)))?;

        let text = response.text.trim();
        if text.is_empty() {
            return Err(LecternError::Transcription(
                "Transcription came back empty".to_string(),
            ));
        }

        debug!("Transcribed {} characters", text.len());
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcriber() -> WhisperTranscriber {
        WhisperTranscriber::from_settings(
            &TranscriptionSettings::default(),
            &OpenAISettings::default(),
            "hint",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_audio_rejected_before_request() {
        let err = transcriber().transcribe(&[], "audio/webm").await.unwrap_err();
        assert!(matches!(err, LecternError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unsupported_mime_rejected_before_request() {
        let err = transcriber().transcribe(b"abc", "text/plain").await.unwrap_err();
        assert!(matches!(err, LecternError::InvalidInput(_)));
    }
}
