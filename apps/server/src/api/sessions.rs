use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::info;

use crate::{
    error::{ApiJson, ApiResult, OrFail},
    main_lib::AppState,
    models::{Message, NewSession, Session, SessionExport, SessionRename, StatusMessage},
};

#[utoipa::path(get, path = "/sessions", responses((status = 200, body = [Session])))]
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Session>>> {
    let sessions = state
        .session_service
        .list_sessions()
        .or_fail("Failed to fetch sessions")?;
    Ok(Json(sessions.into_iter().map(Session::from).collect()))
}

#[utoipa::path(post, path = "/sessions", request_body = NewSession, responses((status = 200, body = Session), (status = 400)))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewSession>,
) -> ApiResult<Json<Session>> {
    let mode = payload
        .mode
        .unwrap_or_else(|| state.registry.default_persona().id.clone());
    let session = state
        .session_service
        .create_session(&payload.name, &mode, payload.is_special)
        .await
        .or_fail("Failed to create session")?;
    Ok(Json(session.into()))
}

#[utoipa::path(post, path = "/sessions/quick", responses((status = 200, body = Session)))]
pub async fn create_quick_session(State(state): State<Arc<AppState>>) -> ApiResult<Json<Session>> {
    let session = state
        .session_service
        .create_quick_session()
        .await
        .or_fail("Failed to create quick session")?;
    Ok(Json(session.into()))
}

#[utoipa::path(patch, path = "/sessions/{id}", request_body = SessionRename, responses((status = 200, body = Session), (status = 404)))]
pub async fn rename_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<SessionRename>,
) -> ApiResult<Json<Session>> {
    let session = state
        .session_service
        .rename_session(&id, &payload.name)
        .await
        .or_fail("Failed to rename session")?;
    Ok(Json(session.into()))
}

#[utoipa::path(delete, path = "/sessions/{id}", responses((status = 200, body = StatusMessage), (status = 404)))]
pub async fn delete_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StatusMessage>> {
    state
        .session_service
        .delete_session(&id)
        .await
        .or_fail("Failed to delete session")?;
    info!("Deleted session {}", id);
    Ok(Json(StatusMessage {
        message: "Session deleted successfully".to_string(),
    }))
}

#[utoipa::path(get, path = "/sessions/{id}/messages", responses((status = 200, body = [Message])))]
pub async fn get_session_messages(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = state
        .session_service
        .get_messages(&id)
        .or_fail("Failed to fetch messages")?;
    Ok(Json(messages.into_iter().map(Message::from).collect()))
}

#[utoipa::path(get, path = "/sessions/{id}/export", responses((status = 200, body = SessionExport), (status = 404)))]
pub async fn export_session(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<SessionExport>> {
    let export = state
        .session_service
        .export_session(&id)
        .or_fail("Failed to export session")?;
    Ok(Json(export.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/quick", post(create_quick_session))
        .route(
            "/sessions/{id}",
            axum::routing::patch(rename_session).delete(delete_session),
        )
        .route("/sessions/{id}/messages", get(get_session_messages))
        .route("/sessions/{id}/export", get(export_session))
}
