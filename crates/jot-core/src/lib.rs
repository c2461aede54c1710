//! # jot-core
//!
//! Core types, traits, and abstractions for the jot notes service.
//!
//! This crate provides the domain entities, request/response models, the
//! error taxonomy, and the repository trait that `jot-db` implements and
//! `jot-api` consumes.

pub mod error;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::{CreateNoteRequest, Note, UpdateNoteRequest};
pub use traits::NoteRepository;
