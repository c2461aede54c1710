//! # jot-db
//!
//! PostgreSQL database layer for jot.
//!
//! This crate provides:
//! - Connection pool management
//! - The note repository implementation
//! - Schema bootstrap for the single `notes` table
//!
//! ## Example
//!
//! ```rust,ignore
//! use jot_db::Database;
//! use jot_core::{CreateNoteRequest, NoteRepository};
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/jot").await?;
//!     db.ensure_schema().await?;
//!
//!     let note = db.notes.insert(Uuid::new_v4(), CreateNoteRequest {
//!         title: "Hello".to_string(),
//!         content: Some("world".to_string()),
//!     }).await?;
//!
//!     println!("Created note: {}", note.id);
//!     Ok(())
//! }
//! ```

pub mod notes;
pub mod pool;

// Re-export core types
pub use jot_core::*;

pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, PoolConfig};

/// Combined database context.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Note repository for CRUD operations.
    pub notes: PgNoteRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            notes: PgNoteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Create the `notes` table if it does not exist yet.
    ///
    /// Schema migration proper is managed externally; this bootstrap only
    /// covers first startup against an empty database.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS notes (
                 id UUID PRIMARY KEY,
                 user_id UUID NOT NULL,
                 title TEXT NOT NULL,
                 content TEXT,
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                 updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_user_id ON notes (user_id)")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}
