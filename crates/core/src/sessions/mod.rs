//! Sessions module - chat sessions, their messages, and the service over them.

mod sessions_model;
mod sessions_service;
mod sessions_traits;

pub use sessions_model::{
    ChatMessage, HistoryEntry, NewChatMessage, NewSession, Session, SessionExport,
};
pub use sessions_service::SessionService;
pub use sessions_traits::{SessionRepositoryTrait, SessionServiceTrait};
