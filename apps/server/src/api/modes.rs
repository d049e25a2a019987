use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::{
    error::{ApiJson, ApiResult, OrFail},
    main_lib::AppState,
    models::{AnalyzeRequest, AnalyzeResponse, ModeInfo, ModePrompt},
};

#[utoipa::path(get, path = "/modes", responses((status = 200, body = [ModeInfo])))]
pub async fn list_modes(State(state): State<Arc<AppState>>) -> Json<Vec<ModeInfo>> {
    Json(state.registry.list().into_iter().map(ModeInfo::from).collect())
}

/// Unknown ids answer with the default persona's prompt.
#[utoipa::path(get, path = "/modes/{id}/prompt", responses((status = 200, body = ModePrompt)))]
pub async fn get_mode_prompt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Json<ModePrompt> {
    Json(ModePrompt {
        mode: state.registry.get(&id).id.clone(),
        prompt: state.registry.prompt_for(&id).to_string(),
    })
}

#[utoipa::path(post, path = "/analyze-request", request_body = AnalyzeRequest, responses((status = 200, body = AnalyzeResponse), (status = 400)))]
pub async fn analyze_request(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<AnalyzeRequest>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let analysis = state
        .classification_service
        .analyze_request(&payload.description)
        .or_fail("Failed to analyze request")?;
    Ok(Json(analysis.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/modes", get(list_modes))
        .route("/modes/{id}/prompt", get(get_mode_prompt))
        .route("/analyze-request", post(analyze_request))
}
