//! Session and message domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::prompts::Exchange;

/// A named conversation thread bound to one persona.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: String,
    pub name: String,
    /// Persona id the session was created under.
    pub mode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_special: bool,
    /// Derived on read; not stored.
    #[serde(default)]
    pub message_count: i64,
}

/// Input model for creating a new session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSession {
    pub id: Option<String>,
    pub name: String,
    pub mode: String,
    pub is_special: bool,
}

/// One persisted turn: the user's text and the model's reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn to_exchange(&self) -> Exchange {
        Exchange::new(self.user_message.clone(), self.ai_response.clone())
    }
}

/// Input model for appending a turn to a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChatMessage {
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
}

/// A message joined with the name of its session, for the history view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: String,
    pub session_id: String,
    pub session_name: Option<String>,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of a session and its full transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionExport {
    pub session: Session,
    pub messages: Vec<ChatMessage>,
    pub exported_at: DateTime<Utc>,
}
