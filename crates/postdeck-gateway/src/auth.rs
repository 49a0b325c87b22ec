//! Bearer-token gate for `/api` routes.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use postdeck_core::config::{AuthConfig, AuthMode};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::app::AppState;

pub async fn require_auth(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    if check_auth(&state.config.gateway.auth, req.headers()) {
        return next.run(req).await;
    }
    warn!(path = %req.uri().path(), "rejected unauthenticated request");
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "Unauthorized. Set 'Authorization: Bearer <your-token>' header.",
            "code": "AUTH_FAILED",
        })),
    )
        .into_response()
}

/// Returns true if the request is authorised.
fn check_auth(auth: &AuthConfig, headers: &HeaderMap) -> bool {
    match auth.mode {
        AuthMode::None => true,
        AuthMode::Token => {
            let expected = match &auth.token {
                Some(t) => t.as_str(),
                // Token mode configured but no token value, deny.
                None => return false,
            };
            extract_bearer(headers)
                .map(|t| t == expected)
                .unwrap_or(false)
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}
