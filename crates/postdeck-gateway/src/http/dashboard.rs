use axum::{extract::State, Json};
use postdeck_posts::{ActivityItem, StateCounts};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct DashboardResponse {
    pub counts: StateCounts,
    pub recent: Vec<ActivityItem>,
}

/// GET /api/dashboard — post totals plus the recent-activity feed.
pub async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        counts: state.dashboard.counts(),
        recent: state
            .dashboard
            .recent_activity(state.config.dashboard.recent_limit),
    })
}
