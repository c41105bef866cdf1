//! Questions command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use uuid::Uuid;

/// Run the questions command.
pub async fn run_questions(room_id: Uuid, settings: Settings) -> Result<()> {
    preflight::check(Operation::Browse, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    let room = orchestrator.require_room(room_id).await?;
    let questions = orchestrator.records().list_questions(room_id).await?;

    if questions.is_empty() {
        Output::info(&format!("No questions asked in '{}' yet.", room.name));
        return Ok(());
    }

    Output::header(&format!("{} ({} questions)", room.name, questions.len()));
    for question in &questions {
        Output::question(question);
    }

    Ok(())
}
