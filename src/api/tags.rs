//! Tag API endpoints
//!
//! Handles HTTP requests for tags (all behind bearer auth):
//! - GET    /api/v1/tags        - List tags with post counts
//! - POST   /api/v1/tags        - Create tag
//! - DELETE /api/v1/tags        - Hard-delete every tag
//! - GET    /api/v1/tags/{id}   - Show tag
//! - PATCH  /api/v1/tags/{id}   - Partial update
//! - PUT    /api/v1/tags/{id}   - Full replace
//! - DELETE /api/v1/tags/{id}   - Soft delete

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::jsonapi::{self, TagDocument, TagListDocument};
use crate::api::middleware::{ApiError, AppState};
use crate::models::{TagPatch, TagPayload};
use crate::services::Resource;

/// Build tag router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags).post(create_tag).delete(clear_tags))
        .route(
            "/{id}",
            get(get_tag).patch(update_tag).put(replace_tag).delete(delete_tag),
        )
}

/// GET /api/v1/tags
pub async fn list_tags(State(state): State<AppState>) -> Result<Json<TagListDocument>, ApiError> {
    let tags = state.tag_service.index().await?;
    Ok(Json(jsonapi::tags_document(&tags)))
}

/// POST /api/v1/tags
pub async fn create_tag(
    State(state): State<AppState>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Result<Json<TagDocument>, ApiError> {
    let Json(payload) = payload?;
    let tag = state.tag_service.store(payload).await?;
    Ok(Json(jsonapi::tag_document(&tag)))
}

/// DELETE /api/v1/tags
pub async fn clear_tags(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.tag_service.clear().await?;
    Ok(StatusCode::OK)
}

/// GET /api/v1/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TagDocument>, ApiError> {
    let Path(id) = id?;
    let tag = state.tag_service.show(id).await?;
    Ok(Json(jsonapi::tag_document(&tag)))
}

/// PATCH /api/v1/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    patch: Result<Json<TagPatch>, JsonRejection>,
) -> Result<Json<TagDocument>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = patch?;
    let tag = state.tag_service.update(id, patch).await?;
    Ok(Json(jsonapi::tag_document(&tag)))
}

/// PUT /api/v1/tags/{id}
pub async fn replace_tag(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<TagPayload>, JsonRejection>,
) -> Result<Json<TagDocument>, ApiError> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    let tag = state.tag_service.replace(id, payload).await?;
    Ok(Json(jsonapi::tag_document(&tag)))
}

/// DELETE /api/v1/tags/{id}
pub async fn delete_tag(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.tag_service.destroy(id).await?;
    Ok(StatusCode::OK)
}
