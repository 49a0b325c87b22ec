use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use postdeck_posts::{Category, Post};
use serde::Deserialize;
use std::sync::Arc;

use super::error::ApiResult;
use crate::app::AppState;

#[derive(Deserialize)]
pub struct CreateCategory {
    #[serde(default)]
    pub name: String,
}

/// GET /api/categories
pub async fn list_categories(State(state): State<Arc<AppState>>) -> Json<Vec<Category>> {
    Json(state.posts.list_categories())
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateCategory>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let Json(req) = payload?;
    let category = state.posts.create_category(&req.name)?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/categories/{id}/posts. An unknown id yields an empty list.
pub async fn list_category_posts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Json<Vec<Post>> {
    Json(state.posts.list_by_category(id))
}
