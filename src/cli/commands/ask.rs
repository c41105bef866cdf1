//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::input::QuestionText;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use uuid::Uuid;

/// Run the ask command.
pub async fn run_ask(room_id: Uuid, question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let question = QuestionText::parse(question)?;
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Searching lecture transcripts...");
    let result = orchestrator.answer_question(room_id, &question).await;
    spinner.finish_and_clear();

    match result {
        Ok(answered) => {
            match &answered.answer {
                Some(answer) => println!("\n{}\n", answer),
                None => Output::warning(
                    "Nothing in this room's lectures is relevant enough to answer that.",
                ),
            }

            if !answered.sources.is_empty() {
                Output::header("Sources");
                for (i, source) in answered.sources.iter().enumerate() {
                    Output::search_result(i + 1, source.similarity, &source.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
