use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::{ApiJson, ApiResult, OrFail},
    main_lib::AppState,
    models::{ChatRequest, ChatResponse, EraseResult, HistoryEntry},
};

#[utoipa::path(post, path = "/chat", request_body = ChatRequest, responses((status = 200, body = ChatResponse), (status = 400), (status = 404)))]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let reply = state
        .chat_service
        .send_message(payload.into())
        .await
        .or_fail("Failed to process message")?;
    Ok(Json(reply.into()))
}

#[utoipa::path(post, path = "/erase", responses((status = 200, body = EraseResult)))]
pub async fn erase_all(State(state): State<Arc<AppState>>) -> ApiResult<Json<EraseResult>> {
    let fresh = state
        .session_service
        .erase_all()
        .await
        .or_fail("Failed to erase data")?;
    info!("All chat data erased; new session {}", fresh.id);
    Ok(Json(EraseResult {
        message: "All data erased successfully".to_string(),
        new_session_id: fresh.id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

#[utoipa::path(get, path = "/history", params(("limit" = Option<i64>, Query, description = "Maximum entries, default 100")), responses((status = 200, body = [HistoryEntry])))]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    let history = state
        .session_service
        .recent_history(query.limit)
        .or_fail("Failed to fetch history")?;
    Ok(Json(history.into_iter().map(HistoryEntry::from).collect()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/chat", post(chat))
        .route("/erase", post(erase_all))
        .route("/history", get(get_history))
}
