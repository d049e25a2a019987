use chrono::{DateTime, Utc};
use persona_chat_ai as ai;
use persona_chat_core::{personas as core_personas, sessions as core_sessions, RequestAnalysis};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ModeInfo {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<core_personas::PersonaSummary> for ModeInfo {
    fn from(p: core_personas::PersonaSummary) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ModePrompt {
    pub mode: String,
    pub prompt: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct AnalyzeResponse {
    pub suggested_mode: String,
    pub suggested_name: String,
    pub mode_info: ModeInfo,
}

impl From<RequestAnalysis> for AnalyzeResponse {
    fn from(a: RequestAnalysis) -> Self {
        Self {
            suggested_mode: a.persona_id,
            suggested_name: a.suggested_title,
            mode_info: a.persona.into(),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct Session {
    pub id: String,
    pub name: String,
    pub mode: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_special: bool,
    pub message_count: i64,
}

impl From<core_sessions::Session> for Session {
    fn from(s: core_sessions::Session) -> Self {
        Self {
            id: s.id,
            name: s.name,
            mode: s.mode,
            created_at: s.created_at,
            updated_at: s.updated_at,
            is_special: s.is_special,
            message_count: s.message_count,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct NewSession {
    #[serde(default)]
    pub name: String,
    /// Defaults to the general persona.
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub is_special: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct SessionRename {
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
}

impl From<core_sessions::ChatMessage> for Message {
    fn from(m: core_sessions::ChatMessage) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            user_message: m.user_message,
            ai_response: m.ai_response,
            mode: m.mode,
            timestamp: m.timestamp,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionExport {
    pub session: Session,
    pub messages: Vec<Message>,
    pub exported_at: DateTime<Utc>,
}

impl From<core_sessions::SessionExport> for SessionExport {
    fn from(e: core_sessions::SessionExport) -> Self {
        Self {
            session: e.session.into(),
            messages: e.messages.into_iter().map(Message::from).collect(),
            exported_at: e.exported_at,
        }
    }
}

fn default_save_history() -> bool {
    true
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default = "default_save_history")]
    pub save_history: bool,
}

impl From<ChatRequest> for ai::SendMessageRequest {
    fn from(r: ChatRequest) -> Self {
        Self {
            message: r.message,
            session_id: r.session_id,
            mode: r.mode,
            save_history: r.save_history,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ChatResponse {
    pub response: String,
    pub message_id: Option<String>,
    pub session_id: Option<String>,
    pub mode: String,
}

impl From<ai::ChatReply> for ChatResponse {
    fn from(r: ai::ChatReply) -> Self {
        Self {
            response: r.response,
            message_id: r.message_id,
            session_id: r.session_id,
            mode: r.mode,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct EraseResult {
    pub message: String,
    pub new_session_id: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct HistoryEntry {
    pub id: String,
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    pub mode: String,
    pub timestamp: DateTime<Utc>,
    pub session_name: Option<String>,
}

impl From<core_sessions::HistoryEntry> for HistoryEntry {
    fn from(h: core_sessions::HistoryEntry) -> Self {
        Self {
            id: h.id,
            session_id: h.session_id,
            user_message: h.user_message,
            ai_response: h.ai_response,
            mode: h.mode,
            timestamp: h.timestamp,
            session_name: h.session_name,
        }
    }
}
