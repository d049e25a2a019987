use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::AiError;
use crate::model_client::{non_empty_reply, CompletionRequest, ModelClientTrait};

/// Runs a local model program once per turn.
///
/// The composed prompt is written to the program's stdin and its stdout is
/// the reply. A non-zero exit status or blank output is a failure.
pub struct CommandModelClient {
    program: String,
    args: Vec<String>,
    timeout: Option<Duration>,
}

impl CommandModelClient {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AiError> {
        let program = program.into();
        if program.trim().is_empty() {
            return Err(AiError::invalid_input("Model command is required"));
        }
        Ok(Self {
            program,
            args,
            timeout,
        })
    }

    async fn run(&self, prompt: &str) -> Result<String, AiError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AiError::Provider(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(prompt.as_bytes())
                .await
                .map_err(|e| AiError::Provider(format!("failed to send prompt: {}", e)))?;
            // Closing stdin signals end of prompt.
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| AiError::Provider(format!("failed to read model output: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("{} exited with {}: {}", self.program, output.status, stderr.trim());
            return Err(AiError::Provider(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        non_empty_reply(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl ModelClientTrait for CommandModelClient {
    fn name(&self) -> &str {
        "command"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, AiError> {
        debug!("Running model command {} for persona {}", self.program, request.persona.id);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(&request.prompt))
                .await
                .map_err(|_| AiError::Timeout(limit.as_millis() as u64))?,
            None => self.run(&request.prompt).await,
        }
    }
}
