//! Typed input contracts checked at the boundary (HTTP, CLI).
//!
//! Values of these types are non-empty by construction, so the pipeline never
//! re-validates them.

use crate::error::{LecternError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A user question: non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QuestionText(String);

impl QuestionText {
    pub fn parse(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LecternError::InvalidInput(
                "Question must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for QuestionText {
    type Error = LecternError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<QuestionText> for String {
    fn from(value: QuestionText) -> Self {
        value.0
    }
}

impl fmt::Display for QuestionText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request to create a room.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "NewRoomRequest")]
pub struct NewRoom {
    name: String,
    description: Option<String>,
}

/// Wire form of [`NewRoom`], before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRoomRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewRoom {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(LecternError::InvalidInput(
                "Room name must not be empty".to_string(),
            ));
        }
        let description = description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok(Self { name, description })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl TryFrom<NewRoomRequest> for NewRoom {
    type Error = LecternError;

    fn try_from(raw: NewRoomRequest) -> Result<Self> {
        Self::new(raw.name, raw.description)
    }
}
