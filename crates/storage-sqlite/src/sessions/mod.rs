//! SQLite storage implementation for chat sessions and messages.

mod model;
mod repository;

pub use model::{MessageDB, SessionDB};
pub use repository::SessionRepository;
