//! Room and question records.
//!
//! Rooms scope everything else: chunks and questions always belong to one
//! room. Questions are written once, with their answer already resolved.

mod memory;
mod sqlite;

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

use crate::error::Result;
use crate::input::NewRoom;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A room: one lecture or course session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A room with its question count, for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    #[serde(flatten)]
    pub room: Room,
    pub question_count: usize,
}

/// A persisted question. `answer_text` is `None` when no relevant context
/// was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: Uuid,
    pub room_id: Uuid,
    pub question_text: String,
    pub answer_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Persistence for rooms and questions.
///
/// Writes are all-or-nothing. Lookups distinguish "not found" (`Ok(None)` or
/// [`LecternError::RoomNotFound`](crate::error::LecternError::RoomNotFound))
/// from storage failures.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a room and return it with its assigned ID.
    async fn create_room(&self, room: &NewRoom) -> Result<Room>;

    /// Look up a room.
    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>>;

    /// All rooms, newest first.
    async fn list_rooms(&self) -> Result<Vec<RoomSummary>>;

    /// Delete a room and its questions. Returns false if it did not exist.
    async fn delete_room(&self, room_id: Uuid) -> Result<bool>;

    /// Persist a question with its resolved answer.
    ///
    /// Fails with `RoomNotFound` if the room does not exist.
    async fn insert_question(
        &self,
        room_id: Uuid,
        question_text: &str,
        answer_text: Option<&str>,
    ) -> Result<Question>;

    /// Questions of a room, newest first.
    async fn list_questions(&self, room_id: Uuid) -> Result<Vec<Question>>;
}
