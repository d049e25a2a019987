//! Database models for sessions and messages.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use persona_chat_core::sessions::{ChatMessage, HistoryEntry, Session};
use persona_chat_core::utils::time_utils::parse_timestamp;

/// Database model for sessions
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SessionDB {
    pub id: String,
    pub name: String,
    pub mode: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_special: bool,
}

/// Database model for messages
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    Associations,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(belongs_to(SessionDB, foreign_key = session_id))]
#[diesel(table_name = crate::schema::messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageDB {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
    pub timestamp: String,
}

// Rows written by this crate always parse; anything else is shown as "now".
fn stored_instant(value: &str) -> DateTime<Utc> {
    parse_timestamp(value).unwrap_or_else(|_| Utc::now())
}

impl SessionDB {
    pub fn into_session(self, message_count: i64) -> Session {
        Session {
            created_at: stored_instant(&self.created_at),
            updated_at: stored_instant(&self.updated_at),
            id: self.id,
            name: self.name,
            mode: self.mode,
            is_special: self.is_special,
            message_count,
        }
    }
}

impl From<MessageDB> for ChatMessage {
    fn from(db: MessageDB) -> Self {
        Self {
            timestamp: stored_instant(&db.timestamp),
            id: db.id,
            session_id: db.session_id,
            user_message: db.user_message,
            ai_response: db.ai_response,
            mode: db.mode,
        }
    }
}

impl MessageDB {
    /// Pairs the row with the name of its session for the history view.
    pub fn into_history_entry(self, session_name: Option<String>) -> HistoryEntry {
        HistoryEntry {
            timestamp: stored_instant(&self.timestamp),
            id: self.id,
            session_id: self.session_id,
            session_name,
            user_message: self.user_message,
            ai_response: self.ai_response,
            mode: self.mode,
        }
    }
}
