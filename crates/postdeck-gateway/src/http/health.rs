use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness check with server metadata.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let sweeper = &state.config.sweeper;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "sweeper": {
            "enabled": sweeper.enabled,
            "interval_secs": sweeper.interval_secs,
            "published_total": state.sweep_stats.published_total(),
            "last_swept_at": state.sweep_stats.last().map(|r| r.swept_at),
        },
    }))
}
