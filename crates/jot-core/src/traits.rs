//! Repository traits for persistence backends.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{CreateNoteRequest, Note, UpdateNoteRequest};

/// Repository for note CRUD operations.
///
/// Each operation maps to a single parameterized SQL statement; no
/// multi-statement transaction is required by any of them. Request field
/// validation (`validate()` on the request types) happens at the API
/// boundary before any repository call, not here.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Insert a new note owned by `user_id` and return the stored row.
    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by ID.
    async fn fetch(&self, id: Uuid) -> Result<Note>;

    /// List all notes owned by `user_id`, oldest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>>;

    /// Apply a partial update and return the updated row.
    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note>;

    /// Permanently delete a note.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Check if a note exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;
}
