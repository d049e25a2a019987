//! Model invocation seam.
//!
//! A `ModelClientTrait` turns a composed prompt into reply text. Backends
//! live in `providers`; `FakeModelClient` is the test double.

use std::sync::Mutex;

use async_trait::async_trait;
use persona_chat_core::Persona;

use crate::error::AiError;

// ============================================================================
// Request
// ============================================================================

/// Everything a backend may need to answer one chat turn.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Fully composed prompt: system prompt, recent history and the turn.
    pub prompt: String,
    /// The raw user text of this turn.
    pub user_message: String,
    /// Persona the turn runs under.
    pub persona: Persona,
}

impl CompletionRequest {
    pub fn new(prompt: String, user_message: impl Into<String>, persona: Persona) -> Self {
        Self {
            prompt,
            user_message: user_message.into(),
            persona,
        }
    }

    pub fn max_tokens(&self) -> u64 {
        u64::from(self.persona.max_length)
    }

    pub fn temperature(&self) -> f64 {
        f64::from(self.persona.temperature)
    }
}

// ============================================================================
// Model Client Trait
// ============================================================================

/// A backend that completes prompts.
#[async_trait]
pub trait ModelClientTrait: Send + Sync {
    /// Short backend name for logs and diagnostics.
    fn name(&self) -> &str;

    /// Produces the reply text for `request`. Implementations return an
    /// error rather than an empty string.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError>;
}

/// Trims surrounding whitespace and rejects blank replies.
pub(crate) fn non_empty_reply(raw: &str) -> Result<String, AiError> {
    let reply = raw.trim();
    if reply.is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(reply.to_string())
}

// ============================================================================
// Fake Client for Testing
// ============================================================================

/// A fake model client that returns a fixed reply or a fixed failure and
/// records the prompts it was given.
pub struct FakeModelClient {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeModelClient {
    /// Create a fake client that always answers with `reply`.
    pub fn with_reply(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a fake client whose every call fails.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ModelClientTrait for FakeModelClient {
    fn name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(AiError::provider("fake model failure")),
        }
    }
}
