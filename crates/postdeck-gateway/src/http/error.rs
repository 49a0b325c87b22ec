//! Error responses: `{"error": "<message>", "code": "<CODE>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use postdeck_posts::PostError;
use postdeck_scheduler::SweepError;
use serde_json::json;
use tracing::warn;

pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<PostError> for ApiError {
    fn from(e: PostError) -> Self {
        let status = match e {
            PostError::Validation(_) => StatusCode::BAD_REQUEST,
            PostError::Referential => StatusCode::UNPROCESSABLE_ENTITY,
            PostError::Duplicate(_) => StatusCode::CONFLICT,
            PostError::NotFound { .. } => StatusCode::NOT_FOUND,
            PostError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            code: e.code(),
            message: e.to_string(),
        }
    }
}

impl From<SweepError> for ApiError {
    fn from(e: SweepError) -> Self {
        match e {
            SweepError::Store(inner) => inner.into(),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: "SWEEP_ERROR",
                message: other.to_string(),
            },
        }
    }
}

/// Undecodable or mistyped bodies are caller input errors like any other.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(code = self.code, error = %self.message, "request failed");
        }
        (
            self.status,
            Json(json!({"error": self.message, "code": self.code})),
        )
            .into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
