//! CLI module for Lectern.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};
use uuid::Uuid;

/// Lectern - grounded Q&A over recorded lectures
///
/// Transcribes lecture audio into rooms and answers questions using only what
/// was said in the room's recordings.
#[derive(Parser, Debug)]
#[command(name = "lectern")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LECTERN_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage rooms
    Room {
        #[command(subcommand)]
        action: RoomAction,
    },

    /// Transcribe an audio file (or load a text transcript) into a room
    Ingest {
        /// Room ID
        room_id: Uuid,

        /// Audio file (mp3, m4a, mp4, wav, webm, ogg, flac)
        file: String,

        /// Treat the file as a plain-text transcript and skip transcription
        #[arg(long)]
        transcript: bool,
    },

    /// Ask a question about a room's lectures
    Ask {
        /// Room ID
        room_id: Uuid,

        /// The question to ask
        question: String,
    },

    /// Search a room for relevant transcript chunks
    Search {
        /// Room ID
        room_id: Uuid,

        /// Search query
        query: String,

        /// Maximum number of results (defaults to retrieval.k)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only show chunks scoring above this similarity (defaults to retrieval.min_similarity)
        #[arg(short, long)]
        min_similarity: Option<f32>,
    },

    /// List the questions asked in a room
    Questions {
        /// Room ID
        room_id: Uuid,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum RoomAction {
    /// Create a room
    Create {
        /// Room name
        name: String,

        /// Optional description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// List rooms, newest first
    List,

    /// Delete a room with its transcripts and questions
    Delete {
        /// Room ID
        room_id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Write the current configuration to the config file
    Init,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask() {
        let room = Uuid::new_v4();
        let cli = Cli::try_parse_from(["lectern", "-vv", "ask", &room.to_string(), "What is ATP?"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Ask { room_id, question } => {
                assert_eq!(room_id, room);
                assert_eq!(question, "What is ATP?");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_room_id() {
        assert!(Cli::try_parse_from(["lectern", "questions", "not-a-uuid"]).is_err());
    }

    #[test]
    fn test_parse_search_overrides() {
        let room = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "lectern",
            "search",
            &room.to_string(),
            "light",
            "--limit",
            "5",
            "--min-similarity",
            "0.25",
        ])
        .unwrap();
        match cli.command {
            Commands::Search {
                limit,
                min_similarity,
                ..
            } => {
                assert_eq!(limit, Some(5));
                assert_eq!(min_similarity, Some(0.25));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
