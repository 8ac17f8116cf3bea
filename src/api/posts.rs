//! Post API endpoints
//!
//! Handles HTTP requests for posts (all behind bearer auth):
//! - GET    /api/v1/posts                      - List posts with their tags
//! - POST   /api/v1/posts                      - Create post
//! - GET    /api/v1/posts/{id}                 - Show post
//! - PATCH  /api/v1/posts/{id}                 - Partial update
//! - PUT    /api/v1/posts/{id}                 - Full replace
//! - DELETE /api/v1/posts/{id}                 - Soft delete
//! - POST   /api/v1/posts/{id}/tags/{tag_id}   - Attach a tag

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::jsonapi::{self, PostDocument, PostListDocument};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{PostPatch, PostPayload};
use crate::services::Resource;

/// Build post router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route(
            "/{id}",
            get(get_post)
                .patch(update_post)
                .put(replace_post)
                .delete(delete_post),
        )
        .route("/{id}/tags/{tag_id}", post(add_tag))
}

/// GET /api/v1/posts
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<PostListDocument>, ApiError> {
    let posts = state.post_service.index().await?;
    Ok(Json(jsonapi::posts_document(&posts)))
}

/// POST /api/v1/posts
pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> Result<Json<PostDocument>, ApiError> {
    let Json(payload) = payload?;
    let post = state.post_service.store(payload).await?;
    Ok(Json(jsonapi::post_document(&post)))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<PostDocument>, ApiError> {
    let Path(id) = id?;
    let post = state.post_service.show(id).await?;
    Ok(Json(jsonapi::post_document(&post)))
}

/// PATCH /api/v1/posts/{id}
///
/// Only `title`, `content` and `published` are applied; other keys are ignored.
pub async fn update_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Json<PostPatch>, JsonRejection>,
) -> Result<Json<PostDocument>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let post = state.post_service.update(id, patch).await?;
    Ok(Json(jsonapi::post_document(&post)))
}

/// PUT /api/v1/posts/{id}
pub async fn replace_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> Result<Json<PostDocument>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let post = state.post_service.replace(id, payload).await?;
    Ok(Json(jsonapi::post_document(&post)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.post_service.destroy(id).await?;
    Ok(StatusCode::OK)
}

/// POST /api/v1/posts/{id}/tags/{tag_id}
pub async fn add_tag(
    State(state): State<AppState>,
    ids: Result<Path<(i64, i64)>, PathRejection>,
) -> Result<Json<PostDocument>, ApiError> {
    let Path((id, tag_id)) = ids?;
    let post = state.post_service.add_tag(id, tag_id).await?;
    Ok(Json(jsonapi::post_document(&post)))
}
