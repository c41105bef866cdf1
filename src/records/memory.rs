//! In-memory record store.

use super::{Question, RecordStore, Room, RoomSummary};
use crate::error::{LecternError, Result};
use crate::input::NewRoom;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

#[derive(Default)]
struct Records {
    rooms: Vec<Room>,
    questions: Vec<Question>,
}

/// Record store kept in process memory.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: RwLock<Records>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_room(&self, room: &NewRoom) -> Result<Room> {
        let created = Room {
            id: Uuid::new_v4(),
            name: room.name().to_string(),
            description: room.description().map(str::to_string),
            created_at: Utc::now(),
        };
        self.write()?.rooms.push(created.clone());
        Ok(created)
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>> {
        Ok(self.read()?.rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn list_rooms(&self) -> Result<Vec<RoomSummary>> {
        let records = self.read()?;
        Ok(records
            .rooms
            .iter()
            .rev()
            .map(|room| RoomSummary {
                room: room.clone(),
                question_count: records
                    .questions
                    .iter()
                    .filter(|q| q.room_id == room.id)
                    .count(),
            })
            .collect())
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<bool> {
        let mut records = self.write()?;
        let before = records.rooms.len();
        records.rooms.retain(|r| r.id != room_id);
        if records.rooms.len() == before {
            return Ok(false);
        }
        records.questions.retain(|q| q.room_id != room_id);
        Ok(true)
    }

    async fn insert_question(
        &self,
        room_id: Uuid,
        question_text: &str,
        answer_text: Option<&str>,
    ) -> Result<Question> {
        let mut records = self.write()?;
        if !records.rooms.iter().any(|r| r.id == room_id) {
            return Err(LecternError::RoomNotFound(room_id));
        }

        let question = Question {
            id: Uuid::new_v4(),
            room_id,
            question_text: question_text.to_string(),
            answer_text: answer_text.map(str::to_string),
            created_at: Utc::now(),
        };
        records.questions.push(question.clone());
        Ok(question)
    }

    async fn list_questions(&self, room_id: Uuid) -> Result<Vec<Question>> {
        Ok(self
            .read()?
            .questions
            .iter()
            .rev()
            .filter(|q| q.room_id == room_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rooms_and_questions() {
        let store = MemoryRecordStore::new();
        let room = store
            .create_room(&NewRoom::new("Biology", None).unwrap())
            .await
            .unwrap();

        store.insert_question(room.id, "first?", Some("yes")).await.unwrap();
        store.insert_question(room.id, "second?", None).await.unwrap();

        let questions = store.list_questions(room.id).await.unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].question_text, "second?");
        assert_eq!(questions[0].answer_text, None);

        let rooms = store.list_rooms().await.unwrap();
        assert_eq!(rooms[0].question_count, 2);
    }

    #[tokio::test]
    async fn test_question_for_unknown_room() {
        let store = MemoryRecordStore::new();
        let missing = Uuid::new_v4();
        let err = store.insert_question(missing, "q", None).await.unwrap_err();
        assert!(matches!(err, LecternError::RoomNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_delete_room_removes_questions() {
        let store = MemoryRecordStore::new();
        let room = store
            .create_room(&NewRoom::new("Chemistry", None).unwrap())
            .await
            .unwrap();
        store.insert_question(room.id, "q", None).await.unwrap();

        assert!(store.delete_room(room.id).await.unwrap());
        assert!(!store.delete_room(room.id).await.unwrap());
        assert!(store.get_room(room.id).await.unwrap().is_none());
        assert!(store.list_questions(room.id).await.unwrap().is_empty());
    }
}
