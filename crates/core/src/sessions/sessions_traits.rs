use async_trait::async_trait;

use super::sessions_model::{
    ChatMessage, HistoryEntry, NewChatMessage, NewSession, Session, SessionExport,
};
use crate::errors::Result;
use crate::prompts::Exchange;

/// Trait for session and message persistence
#[async_trait]
pub trait SessionRepositoryTrait: Send + Sync {
    /// All sessions with message counts, most recently updated first.
    fn list_sessions(&self) -> Result<Vec<Session>>;
    /// Fails with a not-found error when the session does not exist.
    fn get_session(&self, session_id: &str) -> Result<Session>;
    async fn create_session(&self, new_session: NewSession) -> Result<Session>;
    /// Creates a regular session in `mode` named "`prefix` N", where N is one
    /// more than the regular sessions already in that mode. Counting and
    /// inserting share one transaction.
    async fn create_numbered_session(&self, prefix: String, mode: String) -> Result<Session>;
    /// Creates a session and stores its first turn in one transaction. The
    /// message takes the session's mode.
    async fn create_session_with_message(
        &self,
        new_session: NewSession,
        user_message: String,
        ai_response: String,
    ) -> Result<(Session, ChatMessage)>;
    async fn rename_session(&self, session_id: String, name: String) -> Result<Session>;
    /// Deletes the session and its messages; returns the sessions removed.
    async fn delete_session(&self, session_id: String) -> Result<usize>;

    /// Messages of a session, oldest first.
    fn get_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>>;
    /// The newest `limit` exchanges of a session, oldest first.
    fn recent_exchanges(&self, session_id: &str, limit: usize) -> Result<Vec<Exchange>>;
    /// Inserts the message and refreshes the session's `updated_at` in one
    /// transaction.
    async fn append_message(&self, message: NewChatMessage) -> Result<ChatMessage>;

    /// Removes every session and message, then creates `fresh`, atomically.
    async fn reset(&self, fresh: NewSession) -> Result<Session>;
    /// Newest messages across all sessions.
    fn recent_history(&self, limit: i64) -> Result<Vec<HistoryEntry>>;
}

/// Trait for session service operations
#[async_trait]
pub trait SessionServiceTrait: Send + Sync {
    fn list_sessions(&self) -> Result<Vec<Session>>;
    async fn create_session(&self, name: &str, mode: &str, is_special: bool) -> Result<Session>;
    async fn create_quick_session(&self) -> Result<Session>;
    async fn rename_session(&self, session_id: &str, name: &str) -> Result<Session>;
    async fn delete_session(&self, session_id: &str) -> Result<()>;
    fn get_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>>;
    fn export_session(&self, session_id: &str) -> Result<SessionExport>;
    async fn erase_all(&self) -> Result<Session>;
    fn recent_history(&self, limit: Option<i64>) -> Result<Vec<HistoryEntry>>;
}
