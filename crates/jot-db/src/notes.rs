//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use jot_core::{CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest};

/// Column list shared by every statement that returns note rows.
const NOTE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, user_id: Uuid, req: CreateNoteRequest) -> Result<Note> {
        // One timestamp bound for both columns so created_at == updated_at
        // exactly on freshly created notes.
        let now = Utc::now();
        let query = format!(
            "INSERT INTO notes (id, user_id, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {}",
            NOTE_COLUMNS
        );

        let note = sqlx::query_as::<_, Note>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(&req.title)
            .bind(&req.content)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(note)
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let query = format!("SELECT {} FROM notes WHERE id = $1", NOTE_COLUMNS);

        sqlx::query_as::<_, Note>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Note>> {
        // created_at ascending keeps the listing stable for a given
        // database state.
        let query = format!(
            "SELECT {} FROM notes WHERE user_id = $1 ORDER BY created_at ASC",
            NOTE_COLUMNS
        );

        sqlx::query_as::<_, Note>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        // An empty body changes nothing and must not bump updated_at, but
        // still reports 404 for unknown ids via the fetch.
        if req.is_empty() {
            return self.fetch(id).await;
        }

        // $1 = now, $2 = id, dynamic params start at $3. Column names come
        // from a fixed set; values are always bound.
        let mut updates: Vec<String> = vec!["updated_at = $1".to_string()];
        let now = Utc::now();
        let mut param_idx = 3;

        if req.title.is_some() {
            updates.push(format!("title = ${}", param_idx));
            param_idx += 1;
        }
        if req.content.is_some() {
            updates.push(format!("content = ${}", param_idx));
        }

        let query = format!(
            "UPDATE notes SET {} WHERE id = $2 RETURNING {}",
            updates.join(", "),
            NOTE_COLUMNS
        );

        let mut q = sqlx::query_as::<_, Note>(&query).bind(now).bind(id);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }

        q.fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        // The driver reports zero affected rows as success; translate it
        // into the not-found error the API maps to 404.
        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM notes WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(exists)
    }
}
