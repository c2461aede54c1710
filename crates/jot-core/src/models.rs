//! Core data models for jot.
//!
//! These types are shared across all jot crates and represent the note
//! domain entity plus the request bodies accepted by the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A user-owned note.
///
/// `user_id` is an opaque, client-supplied UUID. There is no user table and
/// no server-side validation of the owner's existence.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a note.
///
/// Unknown fields are rejected so malformed clients fail at the validation
/// boundary instead of having payload typos silently dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl CreateNoteRequest {
    /// Validate required fields before any persistence access.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "title is required and must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request body for updating a note.
///
/// Partial update semantics: fields omitted from the body are left
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    /// True when the body carries no fields to change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Validate supplied fields. A supplied title must be non-empty so the
    /// "every note has a non-empty title" invariant survives updates.
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(Error::InvalidInput(
                    "title must be non-empty when provided".to_string(),
                ));
            }
        }
        Ok(())
    }
}
