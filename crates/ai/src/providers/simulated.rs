use async_trait::async_trait;

use crate::error::AiError;
use crate::model_client::{CompletionRequest, ModelClientTrait};

/// Characters of the system prompt echoed in a simulated reply.
const PROMPT_ECHO_CHARS: usize = 100;

/// Deterministic stand-in used when no model runtime is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedModelClient;

#[async_trait]
impl ModelClientTrait for SimulatedModelClient {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        let persona = &request.persona;
        let echo: String = persona.system_prompt.chars().take(PROMPT_ECHO_CHARS).collect();
        Ok(format!(
            "[{} Mode] I understand you're asking: '{}'. {}... This is a simulated response. \
             In a real implementation, this would be processed by an AI model with the \
             appropriate context and specialization.",
            persona.name, request.user_message, echo
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_chat_core::PersonaRegistry;

    #[tokio::test]
    async fn reply_names_the_persona_and_echoes_the_question() {
        let registry = PersonaRegistry::builtin().unwrap();
        let request = CompletionRequest::new(
            "ignored".into(),
            "How do I sort a list?",
            registry.get("coding").clone(),
        );
        let reply = SimulatedModelClient.complete(&request).await.unwrap();
        assert!(reply.starts_with(
            "[Coding Assistant Mode] I understand you're asking: 'How do I sort a list?'. \
             You are an expert programming assistant."
        ));
        assert!(reply.contains("... This is a simulated response."));
    }
}
