//! Request/response types for chat turns.

use serde::{Deserialize, Serialize};

fn default_save_history() -> bool {
    true
}

/// One user message to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// The user's text.
    #[serde(default)]
    pub message: String,
    /// Session to continue; a new session is created when absent and the
    /// turn is saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Persona id. Missing or unknown ids run as the default persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Persist the turn (default true).
    #[serde(default = "default_save_history")]
    pub save_history: bool,
}

impl SendMessageRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: None,
            mode: None,
            save_history: true,
        }
    }
}

/// The answered turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatReply {
    pub response: String,
    /// Id of the stored message; `None` when the turn was not saved.
    pub message_id: Option<String>,
    pub session_id: Option<String>,
    /// Persona the turn actually ran under.
    pub mode: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_history_defaults_to_true() {
        let request: SendMessageRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(request.save_history);
        assert!(request.session_id.is_none());
        assert!(request.mode.is_none());
    }
}
