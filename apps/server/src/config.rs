use std::{net::SocketAddr, path::PathBuf, time::Duration};

use anyhow::{bail, Context};
use persona_chat_ai::{ModelBackend, DEFAULT_OLLAMA_URL};

const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Log line layout written by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Replacement persona catalog; the embedded catalog is used when unset.
    pub personas_file: Option<PathBuf>,
    pub model_backend: ModelBackend,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads `PC_*` variables, loading `.env` first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let listen_addr: SocketAddr = var("PC_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:5000".to_string())
            .parse()
            .context("Invalid PC_LISTEN_ADDR")?;
        let db_path = var("PC_DB_PATH").unwrap_or_else(|| "./db/chat.db".into());
        let cors_allow = var("PC_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = match var("PC_REQUEST_TIMEOUT_MS") {
            Some(v) => v.parse().context("Invalid PC_REQUEST_TIMEOUT_MS")?,
            None => 30000,
        };
        let personas_file = var("PC_PERSONAS_FILE").map(PathBuf::from);
        let log_format = match var("PC_LOG_FORMAT").as_deref() {
            Some(f) if f.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            personas_file,
            model_backend: model_backend(&var)?,
            log_format,
        })
    }
}

fn model_backend<F>(var: &F) -> anyhow::Result<ModelBackend>
where
    F: Fn(&str) -> Option<String>,
{
    let kind = var("PC_MODEL_BACKEND").unwrap_or_else(|| "simulated".into());
    match kind.to_ascii_lowercase().as_str() {
        "simulated" => Ok(ModelBackend::Simulated),
        "ollama" => Ok(ModelBackend::Ollama {
            base_url: var("PC_OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.into()),
            model: var("PC_OLLAMA_MODEL").unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.into()),
        }),
        "command" => {
            let program = var("PC_MODEL_COMMAND")
                .context("PC_MODEL_COMMAND is required for the command backend")?;
            let args = var("PC_MODEL_ARGS")
                .map(|a| a.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            let timeout = match var("PC_MODEL_TIMEOUT_MS") {
                Some(ms) => Some(Duration::from_millis(
                    ms.parse().context("Invalid PC_MODEL_TIMEOUT_MS")?,
                )),
                None => None,
            };
            Ok(ModelBackend::Command {
                program,
                args,
                timeout,
            })
        }
        other => bail!("Unknown PC_MODEL_BACKEND '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr.port(), 5000);
        assert_eq!(config.db_path, "./db/chat.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.model_backend, ModelBackend::Simulated);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.personas_file.is_none());
    }

    #[test]
    fn command_backend_reads_program_args_and_timeout() {
        let config = config_from(&[
            ("PC_MODEL_BACKEND", "command"),
            ("PC_MODEL_COMMAND", "llama-cli"),
            ("PC_MODEL_ARGS", "-m model.gguf  --quiet"),
            ("PC_MODEL_TIMEOUT_MS", "1500"),
        ])
        .unwrap();
        assert_eq!(
            config.model_backend,
            ModelBackend::Command {
                program: "llama-cli".into(),
                args: vec!["-m".into(), "model.gguf".into(), "--quiet".into()],
                timeout: Some(Duration::from_millis(1500)),
            }
        );
    }

    #[test]
    fn command_backend_without_program_is_rejected() {
        assert!(config_from(&[("PC_MODEL_BACKEND", "command")]).is_err());
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(config_from(&[("PC_MODEL_BACKEND", "gpt")]).is_err());
    }

    #[test]
    fn ollama_backend_has_local_defaults() {
        let config = config_from(&[("PC_MODEL_BACKEND", "Ollama")]).unwrap();
        assert_eq!(
            config.model_backend,
            ModelBackend::Ollama {
                base_url: DEFAULT_OLLAMA_URL.into(),
                model: DEFAULT_OLLAMA_MODEL.into(),
            }
        );
    }

    #[test]
    fn request_timeout_must_be_a_number() {
        assert!(config_from(&[("PC_REQUEST_TIMEOUT_MS", "30s")]).is_err());
        let config = config_from(&[("PC_REQUEST_TIMEOUT_MS", "500")]).unwrap();
        assert_eq!(config.request_timeout, Duration::from_millis(500));
    }

    #[test]
    fn bad_listen_addr_is_an_error() {
        assert!(config_from(&[("PC_LISTEN_ADDR", "nowhere")]).is_err());
    }
}
