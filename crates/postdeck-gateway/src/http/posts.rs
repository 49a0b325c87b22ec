//! Post endpoints under `/api/posts`.
//!
//! Listings always answer 200; a storage failure yields an empty array.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use postdeck_core::time;
use postdeck_posts::{Post, PostDraft, PostPatch};
use std::sync::Arc;

use super::error::ApiResult;
use crate::app::AppState;

/// GET /api/posts
pub async fn list_posts(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.posts.list())
}

/// GET /api/posts/archived
pub async fn list_archived(State(state): State<Arc<AppState>>) -> Json<Vec<Post>> {
    Json(state.posts.list_archived())
}

/// GET /api/posts/due: what the next sweep would publish.
pub async fn list_due(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Post>>> {
    Ok(Json(state.sweeper.preview(time::now())?))
}

/// POST /api/posts
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PostDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(draft) = payload?;
    let post = state.posts.create(draft)?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/posts/{id}
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Post>> {
    Ok(Json(state.posts.get(id)?))
}

/// PATCH /api/posts/{id}: partial update; `is_posted` archives/unarchives.
pub async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    payload: Result<Json<PostPatch>, JsonRejection>,
) -> ApiResult<Json<Post>> {
    let Json(patch) = payload?;
    Ok(Json(state.posts.update(id, patch)?))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.posts.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
