//! Persona Chat AI - model invocation and chat turns.
//!
//! # Architecture
//!
//! - `model_client`: the `ModelClientTrait` seam and the fake used in tests
//! - `providers`: Ollama (through rig-core), local command and simulated backends
//! - `chat`: the chat turn service (compose, complete, persist)
//! - `types`: request/response DTOs shared with the HTTP layer
//!
//! # Example
//!
//! ```ignore
//! use persona_chat_ai::{build_model_client, ChatService, ModelBackend, SendMessageRequest};
//!
//! let model = build_model_client(&ModelBackend::Simulated)?;
//! let service = ChatService::new(registry, repository, model);
//! let reply = service.send_message(SendMessageRequest::new("Hi!")).await?;
//! println!("{}", reply.response);
//! ```

pub mod chat;
pub mod error;
pub mod model_client;
pub mod providers;
pub mod types;

pub use chat::ChatService;
pub use error::AiError;
pub use model_client::{CompletionRequest, FakeModelClient, ModelClientTrait};
pub use providers::{
    build_model_client, CommandModelClient, ModelBackend, OllamaModelClient,
    SimulatedModelClient, DEFAULT_OLLAMA_URL,
};
pub use types::{ChatReply, SendMessageRequest};
