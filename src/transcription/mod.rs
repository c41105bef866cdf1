//! Transcription module for Lectern.
//!
//! Turns uploaded audio into plain transcript text using OpenAI Whisper.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::{LecternError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe raw audio bytes of the given MIME type into text.
    ///
    /// Fails with [`LecternError::Transcription`] when the service errors or
    /// returns an empty transcript.
    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String>;
}

/// File extension Whisper expects for a MIME type.
///
/// Parameters such as `;codecs=opus` are ignored.
pub fn extension_for_mime(mime_type: &str) -> Result<&'static str> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let ext = match essence.as_str() {
        "audio/mpeg" | "audio/mp3" | "audio/mpga" => "mp3",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
        "video/mp4" => "mp4",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/webm" | "video/webm" => "webm",
        "audio/ogg" | "application/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        other => {
            return Err(LecternError::InvalidInput(format!(
                "Unsupported audio type: {}",
                if other.is_empty() { "<missing>" } else { other }
            )))
        }
    };
    Ok(ext)
}

/// Guess the MIME type of a local audio file from its extension.
pub fn mime_for_path(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let mime = match ext.as_str() {
        "mp3" | "mpga" => "audio/mpeg",
        "m4a" => "audio/mp4",
        "mp4" => "video/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => {
            return Err(LecternError::InvalidInput(format!(
                "Unsupported audio file: {}",
                path.display()
            )))
        }
    };
    Ok(mime)
}
