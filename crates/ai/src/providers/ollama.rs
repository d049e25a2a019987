use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use rig::{
    client::{CompletionClient, Nothing},
    completion::Prompt,
    providers::ollama,
};

use crate::error::AiError;
use crate::model_client::{non_empty_reply, CompletionRequest, ModelClientTrait};

/// Completes prompts against a local Ollama server through rig-core.
pub struct OllamaModelClient {
    client: ollama::Client<HttpClient>,
    model: String,
}

impl OllamaModelClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, AiError> {
        if model.trim().is_empty() {
            return Err(AiError::invalid_input("Ollama model name is required"));
        }
        let client = ollama::Client::<HttpClient>::builder()
            .api_key(Nothing)
            .base_url(base_url)
            .build()
            .map_err(|e| AiError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ModelClientTrait for OllamaModelClient {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        debug!(
            "Prompting Ollama model {} (temperature {}, max tokens {})",
            self.model,
            request.temperature(),
            request.max_tokens()
        );
        let response = self
            .client
            .agent(&self.model)
            .temperature(request.temperature())
            .max_tokens(request.max_tokens())
            .build()
            .prompt(request.prompt.as_str())
            .await
            .map_err(|e| AiError::Provider(e.to_string()))?;
        non_empty_reply(&response)
    }
}
