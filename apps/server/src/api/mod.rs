use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::Config, main_lib::AppState, models};

mod chat;
mod health;
mod modes;
mod sessions;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        modes::list_modes,
        modes::get_mode_prompt,
        modes::analyze_request,
        sessions::list_sessions,
        sessions::create_session,
        sessions::create_quick_session,
        sessions::rename_session,
        sessions::delete_session,
        sessions::get_session_messages,
        sessions::export_session,
        chat::chat,
        chat::erase_all,
        chat::get_history,
    ),
    components(schemas(
        models::HealthStatus,
        models::ModeInfo,
        models::ModePrompt,
        models::AnalyzeRequest,
        models::AnalyzeResponse,
        models::Session,
        models::NewSession,
        models::SessionRename,
        models::StatusMessage,
        models::Message,
        models::SessionExport,
        models::ChatRequest,
        models::ChatResponse,
        models::EraseResult,
        models::HistoryEntry,
    )),
    tags((name = "persona-chat"))
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.cors_allow.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect::<Vec<_>>();
    base.allow_origin(AllowOrigin::list(origins))
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    Router::new()
        .merge(health::router())
        .merge(modes::router())
        .merge(sessions::router())
        .merge(chat::router())
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
