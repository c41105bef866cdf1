//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::Retriever;
use anyhow::Result;
use uuid::Uuid;

/// Run the search command.
pub async fn run_search(
    room_id: Uuid,
    query: &str,
    limit: Option<usize>,
    min_similarity: Option<f32>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Search, &settings)?;

    let orchestrator = Orchestrator::new(settings)?;
    orchestrator.require_room(room_id).await?;

    let retriever = with_overrides(orchestrator.retriever(), limit, min_similarity);
    Output::kv("Top k", &retriever.k().to_string());
    Output::kv("Min similarity", &format!("{:.2}", retriever.min_similarity()));

    let spinner = Output::spinner("Searching...");
    let results = retriever.retrieve(room_id, query).await;
    spinner.finish_and_clear();

    match results {
        Ok(result) => {
            if result.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!("Found {} results", result.len()));
                for (i, entry) in result.iter().enumerate() {
                    Output::search_result(i + 1, entry.similarity, &entry.text);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}

/// Apply the command-line `--limit` and `--min-similarity` to the configured retriever.
fn with_overrides(base: &Retriever, limit: Option<usize>, min_similarity: Option<f32>) -> Retriever {
    let mut retriever = base.clone();
    if let Some(k) = limit {
        retriever = retriever.with_k(k);
    }
    if let Some(floor) = min_similarity {
        retriever = retriever.with_min_similarity(floor);
    }
    retriever
}
