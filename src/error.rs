//! Error types for Lectern.

use thiserror::Error;
use uuid::Uuid;

/// Library-level error type for Lectern operations.
#[derive(Error, Debug)]
pub enum LecternError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Answer generation failed: {0}")]
    AnswerGenerationFailed(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl LecternError {
    /// Whether this error came from one of the external model capabilities
    /// (embedding, generation or transcription) rather than from local state.
    pub fn is_capability_failure(&self) -> bool {
        matches!(
            self,
            LecternError::EmbeddingUnavailable(_)
                | LecternError::AnswerGenerationFailed(_)
                | LecternError::Transcription(_)
        )
    }
}

/// Result type alias for Lectern operations.
pub type Result<T> = std::result::Result<T, LecternError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_failures() {
        assert!(LecternError::EmbeddingUnavailable("down".into()).is_capability_failure());
        assert!(LecternError::AnswerGenerationFailed("empty".into()).is_capability_failure());
        assert!(!LecternError::RoomNotFound(Uuid::nil()).is_capability_failure());
        assert!(!LecternError::Store("locked".into()).is_capability_failure());
    }

    #[test]
    fn test_dimension_mismatch_message() {
        let err = LecternError::DimensionMismatch { expected: 3, actual: 2 };
        assert_eq!(err.to_string(), "Embedding has 2 dimensions, expected 3");
    }
}
