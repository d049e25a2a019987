use std::fmt::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::RECENT_EXCHANGE_LIMIT;
use crate::personas::PersonaRegistry;

/// One prior user message and the reply it got.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exchange {
    pub user_message: String,
    pub ai_response: String,
}

impl Exchange {
    pub fn new(user_message: impl Into<String>, ai_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ai_response: ai_response.into(),
        }
    }
}

/// Renders the text handed to the model for one chat turn.
#[derive(Debug, Clone)]
pub struct TurnComposer {
    registry: Arc<PersonaRegistry>,
}

impl TurnComposer {
    pub fn new(registry: Arc<PersonaRegistry>) -> Self {
        Self { registry }
    }

    /// Builds the turn prompt.
    ///
    /// `history` is oldest first; only its last three exchanges are used.
    /// Unknown persona ids compose with the default persona.
    pub fn compose(&self, user_text: &str, persona_id: &str, history: &[Exchange]) -> String {
        let persona = self.registry.get(persona_id);
        let mut prompt = String::with_capacity(persona.system_prompt.len() + user_text.len() + 64);

        prompt.push_str(&persona.system_prompt);
        prompt.push_str("\n\n");

        let recent = &history[history.len().saturating_sub(RECENT_EXCHANGE_LIMIT)..];
        if !recent.is_empty() {
            let _ = writeln!(prompt, "{}:", persona.history_header);
            for exchange in recent {
                let _ = writeln!(prompt, "Human: {}", exchange.user_message);
                let _ = writeln!(prompt, "AI: {}", exchange.ai_response);
            }
            prompt.push('\n');
        }

        let _ = write!(prompt, "Human: {}\nAI:", user_text);
        if !persona.reply_lead_in.is_empty() {
            prompt.push(' ');
            prompt.push_str(&persona.reply_lead_in);
        }
        prompt
    }
}
