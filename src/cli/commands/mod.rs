//! CLI command implementations.

mod ask;
mod config;
mod ingest;
mod questions;
mod room;
mod search;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use ingest::run_ingest;
pub use questions::run_questions;
pub use room::run_room;
pub use search::run_search;
pub use serve::{router, run_serve};
