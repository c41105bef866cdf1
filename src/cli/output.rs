//! CLI output formatting utilities.

use crate::records::{Question, RoomSummary};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one room of a listing.
    pub fn room_info(summary: &RoomSummary) {
        let room = &summary.room;
        println!(
            "  {} {} ({}, {} questions, created {})",
            style("*").cyan(),
            style(&room.name).bold(),
            style(room.id).dim(),
            summary.question_count,
            room.created_at.format("%Y-%m-%d %H:%M")
        );
        if let Some(description) = &room.description {
            println!("    {}", content_preview(description, 120));
        }
    }

    /// Print a recorded question with its answer.
    pub fn question(question: &Question) {
        println!(
            "\n{} {} {}",
            style("Q").cyan().bold(),
            style(&question.question_text).bold(),
            style(question.created_at.format("%Y-%m-%d %H:%M")).dim()
        );
        match &question.answer_text {
            Some(answer) => println!("{} {}", style("A").green().bold(), answer),
            None => println!(
                "{} {}",
                style("A").yellow().bold(),
                style("(no relevant lecture content)").dim()
            ),
        }
    }

    /// Print a search hit.
    pub fn search_result(rank: usize, similarity: f32, text: &str) {
        println!(
            "\n{} #{} (similarity: {:.2})",
            style(">>").green(),
            rank,
            similarity
        );
        println!("   {}", content_preview(text, 200));
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Truncate content with ellipsis, on a character boundary.
fn content_preview(content: &str, max_chars: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_chars {
        content
    } else {
        let truncated: String = content.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short\ntext", 20), "short text");
        assert_eq!(content_preview("abcdef", 3), "abc...");
        assert_eq!(content_preview("ååååå", 2), "åå...");
    }
}
