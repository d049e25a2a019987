//! Model backends and the factory that picks one from configuration.

mod command;
mod ollama;
mod simulated;

use std::sync::Arc;
use std::time::Duration;

use log::info;

pub use command::CommandModelClient;
pub use ollama::OllamaModelClient;
pub use simulated::SimulatedModelClient;

use crate::error::AiError;
use crate::model_client::ModelClientTrait;

/// Default Ollama endpoint on the local machine.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Which backend answers chat turns, with its settings.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelBackend {
    /// Canned replies; needs no runtime.
    #[default]
    Simulated,
    /// Local Ollama server over HTTP.
    Ollama { base_url: String, model: String },
    /// A local program that reads the prompt on stdin and writes the reply
    /// to stdout.
    Command {
        program: String,
        args: Vec<String>,
        timeout: Option<Duration>,
    },
}

impl ModelBackend {
    /// Backend name as written in configuration.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelBackend::Simulated => "simulated",
            ModelBackend::Ollama { .. } => "ollama",
            ModelBackend::Command { .. } => "command",
        }
    }
}

/// Builds the client for `backend`.
pub fn build_model_client(backend: &ModelBackend) -> Result<Arc<dyn ModelClientTrait>, AiError> {
    info!("Using '{}' model backend", backend.kind());
    let client: Arc<dyn ModelClientTrait> = match backend {
        ModelBackend::Simulated => Arc::new(SimulatedModelClient),
        ModelBackend::Ollama { base_url, model } => {
            Arc::new(OllamaModelClient::new(base_url, model)?)
        }
        ModelBackend::Command {
            program,
            args,
            timeout,
        } => Arc::new(CommandModelClient::new(program.clone(), args.clone(), *timeout)?),
    };
    Ok(client)
}
