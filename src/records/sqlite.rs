//! SQLite record store.

use super::{Question, RecordStore, Room, RoomSummary};
use crate::error::{LecternError, Result};
use crate::input::NewRoom;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument};
use uuid::Uuid;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS rooms (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS questions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        room_id TEXT NOT NULL REFERENCES rooms(id),
        question TEXT NOT NULL,
        answer TEXT,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_questions_room_seq ON questions(room_id, seq);
"#;

/// Record store on SQLite. Can share a database file with
/// [`SqliteVectorStore`](crate::chunk_store::SqliteVectorStore).
pub struct SqliteRecordStore {
    conn: Mutex<Connection>,
}

impl SqliteRecordStore {
    /// Open (or create) a record store at `path`.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite record store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory record store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LecternError::Store(format!("Failed to acquire lock: {}", e)))
    }

    fn room_exists(conn: &Connection, room_id: Uuid) -> Result<bool> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM rooms WHERE id = ?1",
            params![room_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| LecternError::Store(format!("Invalid id '{}': {}", s, e)))
}

fn parse_time(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LecternError::Store(format!("Invalid timestamp '{}': {}", s, e)))
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    #[instrument(skip(self, room), fields(name = %room.name()))]
    async fn create_room(&self, room: &NewRoom) -> Result<Room> {
        let created = Room {
            id: Uuid::new_v4(),
            name: room.name().to_string(),
            description: room.description().map(str::to_string),
            created_at: Utc::now(),
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO rooms (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                created.id.to_string(),
                created.name,
                created.description,
                created.created_at.to_rfc3339(),
            ],
        )?;

        info!("Created room {}", created.id);
        Ok(created)
    }

    async fn get_room(&self, room_id: Uuid) -> Result<Option<Room>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, name, description, created_at FROM rooms WHERE id = ?1",
                params![room_id.to_string()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, description, created_at)| -> Result<Room> {
            Ok(Room {
                id: parse_uuid(&id)?,
                name,
                description,
                created_at: parse_time(&created_at)?,
            })
        })
        .transpose()
    }

    async fn list_rooms(&self) -> Result<Vec<RoomSummary>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT r.id, r.name, r.description, r.created_at, COUNT(q.id) AS question_count
            FROM rooms r
            LEFT JOIN questions q ON q.room_id = r.id
            GROUP BY r.id
            ORDER BY r.created_at DESC
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut rooms = Vec::new();
        for row in rows {
            let (id, name, description, created_at, count) = row?;
            rooms.push(RoomSummary {
                room: Room {
                    id: parse_uuid(&id)?,
                    name,
                    description,
                    created_at: parse_time(&created_at)?,
                },
                question_count: count as usize,
            });
        }
        Ok(rooms)
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: Uuid) -> Result<bool> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM questions WHERE room_id = ?1",
            params![room_id.to_string()],
        )?;
        let deleted = tx.execute("DELETE FROM rooms WHERE id = ?1", params![room_id.to_string()])?;
        tx.commit()?;

        info!("Deleted room {} ({} rows)", room_id, deleted);
        Ok(deleted > 0)
    }

    #[instrument(skip(self, question_text, answer_text), fields(room_id = %room_id))]
    async fn insert_question(
        &self,
        room_id: Uuid,
        question_text: &str,
        answer_text: Option<&str>,
    ) -> Result<Question> {
        let question = Question {
            id: Uuid::new_v4(),
            room_id,
            question_text: question_text.to_string(),
            answer_text: answer_text.map(str::to_string),
            created_at: Utc::now(),
        };

        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        if !Self::room_exists(&tx, room_id)? {
            return Err(LecternError::RoomNotFound(room_id));
        }

        tx.execute(
            r#"
            INSERT INTO questions (id, room_id, question, answer, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                question.id.to_string(),
                room_id.to_string(),
                question.question_text,
                question.answer_text,
                question.created_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        debug!("Stored question {}", question.id);
        Ok(question)
    }

    async fn list_questions(&self, room_id: Uuid) -> Result<Vec<Question>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, question, answer, created_at
            FROM questions
            WHERE room_id = ?1
            ORDER BY seq DESC
            "#,
        )?;

        let rows = stmt.query_map(params![room_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut questions = Vec::new();
        for row in rows {
            let (id, question_text, answer_text, created_at) = row?;
            questions.push(Question {
                id: parse_uuid(&id)?,
                room_id,
                question_text,
                answer_text,
                created_at: parse_time(&created_at)?,
            });
        }
        Ok(questions)
    }
}
