//! Model invocation and chat turn error types.

use persona_chat_core::Error as CoreError;
use thiserror::Error;

/// Errors raised while producing a chat turn.
#[derive(Debug, Error)]
pub enum AiError {
    /// Invalid input or request.
    #[error("{0}")]
    InvalidInput(String),

    /// The model backend failed (HTTP error, process failure, bad output).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model backend did not answer in time.
    #[error("Model did not respond within {0} ms")]
    Timeout(u64),

    /// The model answered with nothing usable.
    #[error("Model returned an empty response")]
    EmptyResponse,

    /// Core error (validation, persistence).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AiError {
    /// Create a new invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a new provider error.
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }
}
