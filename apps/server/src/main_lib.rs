use std::sync::Arc;

use crate::config::{Config, LogFormat};
use persona_chat_ai::{build_model_client, ChatService};
use persona_chat_core::{
    ClassificationService, ClassificationServiceTrait, PersonaRegistry, SessionService,
    SessionServiceTrait,
};
use persona_chat_storage_sqlite::{db, SessionRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub registry: Arc<PersonaRegistry>,
    pub classification_service: Arc<dyn ClassificationServiceTrait>,
    pub session_service: Arc<dyn SessionServiceTrait>,
    pub chat_service: Arc<ChatService>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    // `try_init` also bridges the `log` records emitted by the library crates.
    let result = match format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Text => registry.with(fmt::layer()).try_init(),
    };
    if let Err(e) = result {
        eprintln!("Tracing already initialized: {}", e);
    }
}

fn load_registry(config: &Config) -> anyhow::Result<PersonaRegistry> {
    let registry = match &config.personas_file {
        Some(path) => {
            tracing::info!("Loading personas from {}", path.display());
            PersonaRegistry::from_file(path)?
        }
        None => PersonaRegistry::builtin()?,
    };
    Ok(registry)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let registry = Arc::new(load_registry(config)?);
    tracing::info!("Loaded {} personas", registry.personas().len());

    let db_path = db::init(&config.db_path)?;
    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let session_repository = Arc::new(SessionRepository::new(pool.clone(), writer));
    let model = build_model_client(&config.model_backend)?;

    let classification_service = Arc::new(ClassificationService::new(registry.clone()));
    let session_service = Arc::new(SessionService::new(
        session_repository.clone(),
        registry.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(
        registry.clone(),
        session_repository,
        model,
    ));
    tracing::info!("Chat turns answered by '{}'", chat_service.model_name());

    Ok(Arc::new(AppState {
        registry,
        classification_service,
        session_service,
        chat_service,
    }))
}
