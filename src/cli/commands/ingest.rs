//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::transcription::mime_for_path;
use anyhow::{Context, Result};
use std::path::PathBuf;
use uuid::Uuid;

/// Run the ingest command.
pub async fn run_ingest(
    room_id: Uuid,
    file: &str,
    transcript: bool,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let path = PathBuf::from(shellexpand::tilde(file).to_string());
    let orchestrator = Orchestrator::new(settings)?;
    let room = orchestrator.require_room(room_id).await?;

    let result = if transcript {
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let spinner = Output::spinner("Indexing transcript...");
        let result = orchestrator.ingest_transcript(room_id, &text).await;
        spinner.finish_and_clear();
        result
    } else {
        let mime_type = mime_for_path(&path)?;
        let audio = tokio::fs::read(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let spinner = Output::spinner(&format!(
            "Transcribing {} ({:.1} MB)...",
            path.display(),
            audio.len() as f64 / 1_048_576.0
        ));
        let result = orchestrator.ingest_audio(room_id, &audio, mime_type).await;
        spinner.finish_and_clear();
        result
    };

    match result {
        Ok(result) => {
            Output::success(&format!(
                "Indexed {} chunks into '{}'",
                result.chunk_ids.len(),
                room.name
            ));
            Output::kv("Transcript", &format!("{} characters", result.characters));
        }
        Err(e) => {
            Output::error(&format!("Ingestion failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
