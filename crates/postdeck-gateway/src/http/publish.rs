//! Sweep trigger — GET or POST /api/publish-scheduled.
//!
//! Takes no input. Publishes every due post and reports how many moved.
//! Suitable for an external cron hitting the endpoint when the background
//! engine is disabled.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiResult;
use crate::app::AppState;

#[derive(Serialize)]
pub struct PublishResponse {
    pub message: String,
    pub count: usize,
    pub post_ids: Vec<i64>,
    pub swept_at: DateTime<Utc>,
}

pub async fn publish_scheduled(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<PublishResponse>> {
    let report = state.sweeper.sweep()?;
    state.sweep_stats.record(&report);
    Ok(Json(PublishResponse {
        message: report.message(),
        count: report.published,
        post_ids: report.post_ids,
        swept_at: report.swept_at,
    }))
}
