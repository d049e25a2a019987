//! Chat turn service.
//!
//! Composes a persona prompt with the session's recent exchanges, asks the
//! configured model for a reply and stores the turn.

use std::sync::Arc;

use log::{debug, error, info};

use persona_chat_core::constants::RECENT_EXCHANGE_LIMIT;
use persona_chat_core::sessions::{NewChatMessage, NewSession, SessionRepositoryTrait};
use persona_chat_core::{Error as CoreError, PersonaRegistry, SessionNamer, TurnComposer};

use crate::error::AiError;
use crate::model_client::{CompletionRequest, ModelClientTrait};
use crate::types::{ChatReply, SendMessageRequest};

/// Produces and records chat turns.
pub struct ChatService {
    registry: Arc<PersonaRegistry>,
    repository: Arc<dyn SessionRepositoryTrait>,
    model: Arc<dyn ModelClientTrait>,
    composer: TurnComposer,
    namer: SessionNamer,
}

impl ChatService {
    pub fn new(
        registry: Arc<PersonaRegistry>,
        repository: Arc<dyn SessionRepositoryTrait>,
        model: Arc<dyn ModelClientTrait>,
    ) -> Self {
        Self {
            composer: TurnComposer::new(registry.clone()),
            namer: SessionNamer::new(registry.clone()),
            registry,
            repository,
            model,
        }
    }

    /// Name of the backend answering turns.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Answers one message.
    ///
    /// Unknown modes fall back to the default persona. A blank session id
    /// counts as none. When the turn is saved without a session id, a
    /// session named after the message is created together with the turn.
    pub async fn send_message(&self, request: SendMessageRequest) -> Result<ChatReply, AiError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(CoreError::missing_field("Message").into());
        }
        let session_id = request
            .session_id
            .filter(|session_id| !session_id.trim().is_empty());

        let persona = self
            .registry
            .get(request.mode.as_deref().unwrap_or_default())
            .clone();

        let history = match &session_id {
            Some(session_id) => self
                .repository
                .recent_exchanges(session_id, RECENT_EXCHANGE_LIMIT)?,
            None => Vec::new(),
        };
        debug!(
            "Composing turn for persona {} with {} prior exchanges",
            persona.id,
            history.len()
        );
        let prompt = self.composer.compose(message, &persona.id, &history);

        let completion = CompletionRequest::new(prompt, message, persona);
        let response = self.model.complete(&completion).await.map_err(|e| {
            error!("Model backend '{}' failed: {}", self.model.name(), e);
            e
        })?;
        let mode = completion.persona.id;

        if !request.save_history {
            return Ok(ChatReply {
                response,
                message_id: None,
                session_id,
                mode,
            });
        }

        let stored = match session_id {
            Some(session_id) => {
                self.repository
                    .append_message(NewChatMessage {
                        session_id,
                        user_message: message.to_string(),
                        ai_response: response.clone(),
                        mode: mode.clone(),
                    })
                    .await?
            }
            None => {
                let (session, stored) = self
                    .repository
                    .create_session_with_message(
                        NewSession {
                            id: None,
                            name: self.namer.marker_title(message, &mode),
                            mode: mode.clone(),
                            is_special: false,
                        },
                        message.to_string(),
                        response.clone(),
                    )
                    .await?;
                info!("Started session {} ({})", session.id, session.name);
                stored
            }
        };

        Ok(ChatReply {
            response,
            message_id: Some(stored.id),
            session_id: Some(stored.session_id),
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model_client::FakeModelClient;
    use async_trait::async_trait;
    use chrono::Utc;
    use persona_chat_core::prompts::Exchange;
    use persona_chat_core::sessions::{ChatMessage, HistoryEntry, Session};
    use persona_chat_core::Result as CoreResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRepository {
        sessions: Mutex<Vec<Session>>,
        messages: Mutex<Vec<ChatMessage>>,
        sessions_started_with_a_turn: Mutex<usize>,
    }

    #[async_trait]
    impl SessionRepositoryTrait for RecordingRepository {
        fn list_sessions(&self) -> CoreResult<Vec<Session>> {
            Ok(self.sessions.lock().unwrap().clone())
        }

        fn get_session(&self, session_id: &str) -> CoreResult<Session> {
            self.sessions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == session_id)
                .cloned()
                .ok_or_else(|| CoreError::not_found(session_id))
        }

        async fn create_session(&self, new_session: NewSession) -> CoreResult<Session> {
            let mut sessions = self.sessions.lock().unwrap();
            let now = Utc::now();
            let session = Session {
                id: format!("s{}", sessions.len() + 1),
                name: new_session.name,
                mode: new_session.mode,
                created_at: now,
                updated_at: now,
                is_special: new_session.is_special,
                message_count: 0,
            };
            sessions.push(session.clone());
            Ok(session)
        }

        async fn create_numbered_session(&self, prefix: String, mode: String) -> CoreResult<Session> {
            let ordinal = self.sessions.lock().unwrap().len() + 1;
            self.create_session(NewSession {
                id: None,
                name: format!("{} {}", prefix, ordinal),
                mode,
                is_special: false,
            })
            .await
        }

        async fn create_session_with_message(
            &self,
            new_session: NewSession,
            user_message: String,
            ai_response: String,
        ) -> CoreResult<(Session, ChatMessage)> {
            *self.sessions_started_with_a_turn.lock().unwrap() += 1;
            let session = self.create_session(new_session).await?;
            let message = self
                .append_message(NewChatMessage {
                    session_id: session.id.clone(),
                    user_message,
                    ai_response,
                    mode: session.mode.clone(),
                })
                .await?;
            Ok((session, message))
        }

        async fn rename_session(&self, session_id: String, _name: String) -> CoreResult<Session> {
            self.get_session(&session_id)
        }

        async fn delete_session(&self, _session_id: String) -> CoreResult<usize> {
            Ok(0)
        }

        fn get_messages(&self, session_id: &str) -> CoreResult<Vec<ChatMessage>> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.session_id == session_id)
                .cloned()
                .collect())
        }

        fn recent_exchanges(&self, session_id: &str, limit: usize) -> CoreResult<Vec<Exchange>> {
            let messages = self.get_messages(session_id)?;
            let skip = messages.len().saturating_sub(limit);
            Ok(messages.iter().skip(skip).map(ChatMessage::to_exchange).collect())
        }

        async fn append_message(&self, message: NewChatMessage) -> CoreResult<ChatMessage> {
            self.get_session(&message.session_id)?;
            let mut messages = self.messages.lock().unwrap();
            let stored = ChatMessage {
                id: format!("m{}", messages.len() + 1),
                session_id: message.session_id,
                user_message: message.user_message,
                ai_response: message.ai_response,
                mode: message.mode,
                timestamp: Utc::now(),
            };
            messages.push(stored.clone());
            Ok(stored)
        }

        async fn reset(&self, fresh: NewSession) -> CoreResult<Session> {
            self.create_session(fresh).await
        }

        fn recent_history(&self, _limit: i64) -> CoreResult<Vec<HistoryEntry>> {
            Ok(Vec::new())
        }
    }

    fn service_with(
        model: Arc<FakeModelClient>,
    ) -> (ChatService, Arc<RecordingRepository>) {
        let registry = Arc::new(PersonaRegistry::builtin().unwrap());
        let repository = Arc::new(RecordingRepository::default());
        (
            ChatService::new(registry, repository.clone(), model),
            repository,
        )
    }

    #[tokio::test]
    async fn first_turn_creates_a_marker_named_session() {
        let model = Arc::new(FakeModelClient::with_reply("Use a list comprehension."));
        let (service, repository) = service_with(model);

        let mut request = SendMessageRequest::new("  How do I filter a list in Python?  ");
        request.mode = Some("coding".into());
        let reply = service.send_message(request).await.unwrap();

        assert_eq!(reply.response, "Use a list comprehension.");
        assert_eq!(reply.mode, "coding");
        assert_eq!(reply.session_id.as_deref(), Some("s1"));
        assert_eq!(reply.message_id.as_deref(), Some("m1"));

        let sessions = repository.list_sessions().unwrap();
        assert_eq!(sessions[0].name, "Python Help");
        let stored = repository.get_messages("s1").unwrap();
        assert_eq!(stored[0].user_message, "How do I filter a list in Python?");
    }

    #[tokio::test]
    async fn unknown_mode_runs_as_general() {
        let model = Arc::new(FakeModelClient::with_reply("ok"));
        let (service, _) = service_with(model.clone());

        let mut request = SendMessageRequest::new("hello");
        request.mode = Some("pirate".into());
        request.save_history = false;
        let reply = service.send_message(request).await.unwrap();

        assert_eq!(reply.mode, "general");
        assert!(reply.message_id.is_none());
        assert!(reply.session_id.is_none());
        assert!(model.prompts()[0].starts_with("You are a helpful, friendly"));
    }

    #[tokio::test]
    async fn follow_up_turns_carry_recent_history() {
        let model = Arc::new(FakeModelClient::with_reply("answer"));
        let (service, _) = service_with(model.clone());

        let first = service
            .send_message(SendMessageRequest::new("first question"))
            .await
            .unwrap();
        let mut second = SendMessageRequest::new("second question");
        second.session_id = first.session_id.clone();
        service.send_message(second).await.unwrap();

        let prompt = &model.prompts()[1];
        assert!(prompt.contains("Previous conversation:\nHuman: first question\nAI: answer\n"));
        assert!(prompt.ends_with("Human: second question\nAI:"));
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_the_model_runs() {
        let model = Arc::new(FakeModelClient::with_reply("never"));
        let (service, _) = service_with(model.clone());

        let err = service
            .send_message(SendMessageRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Core(CoreError::Validation(_))));
        assert!(model.prompts().is_empty());
    }

    #[tokio::test]
    async fn model_failure_saves_nothing() {
        let (service, repository) = service_with(Arc::new(FakeModelClient::failing()));

        let err = service
            .send_message(SendMessageRequest::new("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Provider(_)));
        assert!(repository.list_sessions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_session_id_starts_a_new_session() {
        let (service, repository) = service_with(Arc::new(FakeModelClient::with_reply("ok")));

        let mut request = SendMessageRequest::new("hello there");
        request.session_id = Some("  ".into());
        let reply = service.send_message(request).await.unwrap();

        assert_eq!(reply.session_id.as_deref(), Some("s1"));
        assert_eq!(repository.list_sessions().unwrap().len(), 1);
        assert_eq!(repository.get_messages("s1").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn only_the_first_turn_creates_a_session() {
        let (service, repository) = service_with(Arc::new(FakeModelClient::with_reply("ok")));

        let first = service
            .send_message(SendMessageRequest::new("first question"))
            .await
            .unwrap();
        let mut second = SendMessageRequest::new("second question");
        second.session_id = first.session_id.clone();
        let second = service.send_message(second).await.unwrap();

        assert_eq!(*repository.sessions_started_with_a_turn.lock().unwrap(), 1);
        assert_eq!(second.session_id, first.session_id);
        assert_eq!(repository.get_messages("s1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (service, _) = service_with(Arc::new(FakeModelClient::with_reply("ok")));

        let mut request = SendMessageRequest::new("hello");
        request.session_id = Some("ghost".into());
        let err = service.send_message(request).await.unwrap_err();
        assert!(matches!(err, AiError::Core(ref e) if e.is_not_found()));
    }
}
