use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use super::sessions_model::{HistoryEntry, NewSession, Session, SessionExport};
use super::sessions_traits::{SessionRepositoryTrait, SessionServiceTrait};
use crate::constants::{DEFAULT_HISTORY_LIMIT, QUICK_SESSION_PREFIX};
use crate::errors::{Error, Result, ValidationError};
use crate::personas::PersonaRegistry;
use crate::sessions::ChatMessage;

/// Service for managing chat sessions and their transcripts
pub struct SessionService {
    repository: Arc<dyn SessionRepositoryTrait>,
    registry: Arc<PersonaRegistry>,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepositoryTrait>, registry: Arc<PersonaRegistry>) -> Self {
        Self {
            repository,
            registry,
        }
    }

    /// The session left behind by `erase_all`.
    fn first_quick_session(&self) -> NewSession {
        NewSession {
            id: None,
            name: format!("{} 1", QUICK_SESSION_PREFIX),
            mode: self.registry.default_persona().id.clone(),
            is_special: false,
        }
    }
}

fn required_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::missing_field("Session name"));
    }
    Ok(name.to_string())
}

#[async_trait::async_trait]
impl SessionServiceTrait for SessionService {
    fn list_sessions(&self) -> Result<Vec<Session>> {
        self.repository.list_sessions()
    }

    async fn create_session(&self, name: &str, mode: &str, is_special: bool) -> Result<Session> {
        let name = required_name(name)?;
        if !self.registry.contains(mode) {
            return Err(ValidationError::UnknownPersona(mode.to_string()).into());
        }
        debug!("Creating session '{}' in mode '{}'", name, mode);
        self.repository
            .create_session(NewSession {
                id: None,
                name,
                mode: mode.to_string(),
                is_special,
            })
            .await
    }

    async fn create_quick_session(&self) -> Result<Session> {
        let default_mode = self.registry.default_persona().id.clone();
        self.repository
            .create_numbered_session(QUICK_SESSION_PREFIX.to_string(), default_mode)
            .await
    }

    async fn rename_session(&self, session_id: &str, name: &str) -> Result<Session> {
        let name = required_name(name)?;
        self.repository
            .rename_session(session_id.to_string(), name)
            .await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let removed = self
            .repository
            .delete_session(session_id.to_string())
            .await?;
        if removed == 0 {
            return Err(Error::not_found(format!("Session {}", session_id)));
        }
        Ok(())
    }

    fn get_messages(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.repository.get_messages(session_id)
    }

    fn export_session(&self, session_id: &str) -> Result<SessionExport> {
        let session = self.repository.get_session(session_id)?;
        let messages = self.repository.get_messages(session_id)?;
        Ok(SessionExport {
            session,
            messages,
            exported_at: Utc::now(),
        })
    }

    async fn erase_all(&self) -> Result<Session> {
        info!("Erasing all sessions and messages");
        self.repository.reset(self.first_quick_session()).await
    }

    fn recent_history(&self, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let limit = limit
            .filter(|limit| *limit > 0)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        self.repository.recent_history(limit)
    }
}
