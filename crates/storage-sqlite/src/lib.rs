//! SQLite storage implementation for Persona Chat.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `persona-chat-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - The single-writer actor that serializes every write
//! - Database-specific model types (with Diesel derives)
//!
//! ```text
//!     core (domain)        ai (chat turns)
//!          │                     │
//!          └─────────┬───────────┘
//!                    ▼
//!        storage-sqlite (this crate)
//!                    │
//!                    ▼
//!                SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod sessions;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use sessions::SessionRepository;

// Re-export from persona-chat-core for convenience
pub use persona_chat_core::errors::{DatabaseError, Error, Result};
