use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use persona_chat_ai::AiError;
use persona_chat_core::errors::{DatabaseError, Error as CoreError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Ai(#[from] AiError),
    #[error("{0}")]
    BadRequest(String),
    /// A collaborator failed; clients only see `message`.
    #[error("{message}: {source}")]
    Failed {
        message: &'static str,
        #[source]
        source: Box<ApiError>,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn core_status(err: &CoreError) -> (StatusCode, String) {
    match err {
        CoreError::Validation(inner) => (StatusCode::BAD_REQUEST, inner.to_string()),
        CoreError::Database(DatabaseError::NotFound(what)) => {
            let msg = if what.to_lowercase().contains("not found") {
                what.clone()
            } else {
                format!("{} not found", what)
            };
            (StatusCode::NOT_FOUND, msg)
        }
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Core(e) => core_status(e),
            ApiError::Ai(AiError::Core(e)) => core_status(e),
            ApiError::Ai(AiError::InvalidInput(reason)) => {
                (StatusCode::BAD_REQUEST, reason.clone())
            }
            ApiError::Ai(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Failed { message, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_message().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// JSON body extractor whose rejections use the `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Replaces server-side failures with a client-facing message. Client
/// errors (validation, not found) pass through untouched.
pub trait OrFail<T> {
    fn or_fail(self, message: &'static str) -> ApiResult<T>;
}

impl<T, E: Into<ApiError>> OrFail<T> for Result<T, E> {
    fn or_fail(self, message: &'static str) -> ApiResult<T> {
        self.map_err(|e| {
            let err = e.into();
            if err.status().is_server_error() {
                ApiError::Failed {
                    message,
                    source: Box::new(err),
                }
            } else {
                err
            }
        })
    }
}
