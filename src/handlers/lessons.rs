use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::database::models::{Lesson, LessonPayload};
use crate::error::ApiError;
use crate::handlers::{caller, json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;
use crate::types::Operation;

/// POST /lessons
pub async fn create(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<LessonPayload>>, JsonRejection>,
) -> ApiResult<Lesson> {
    let payload = json_body(body, "lesson")?;
    state
        .validator
        .authorize(Operation::LessonCreate, caller(&principal))
        .await?;

    let lesson = state.lessons.create(&payload).await?;
    state.caches.lessons.put(lesson.id, lesson.clone()).await;
    Ok(ApiResponse::created(lesson))
}

/// GET /lessons/:id
pub async fn get(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Lesson> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::LessonRead, caller(&principal))
        .await?;

    if let Some(lesson) = state.caches.lessons.get(id).await {
        return Ok(ApiResponse::success(lesson));
    }
    let lesson = state.lessons.get(id).await?;
    state.caches.lessons.put(id, lesson.clone()).await;
    Ok(ApiResponse::success(lesson))
}

/// PUT /lessons
pub async fn update(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<LessonPayload>>, JsonRejection>,
) -> ApiResult<Lesson> {
    let payload = json_body(body, "lesson")?;
    state
        .validator
        .authorize(Operation::LessonUpdate, caller(&principal))
        .await?;

    let lesson = state.lessons.update(&payload).await?;
    state.caches.lessons.put(lesson.id, lesson.clone()).await;
    Ok(ApiResponse::success(lesson))
}

/// DELETE /lessons/:id
pub async fn delete(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::LessonDelete, caller(&principal))
        .await?;

    state.lessons.delete(id).await?;
    state.caches.lessons.remove(id).await;
    Ok(ApiResponse::no_content())
}

/// GET /lessons
pub async fn list(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Vec<Lesson>> {
    state
        .validator
        .authorize(Operation::LessonList, caller(&principal))
        .await?;

    Ok(ApiResponse::success(state.lessons.list().await?))
}

/// GET /lessons/all/:group
pub async fn by_group(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    group: Result<Path<String>, PathRejection>,
) -> ApiResult<Vec<Lesson>> {
    let Path(group) = group.map_err(|e| ApiError::invalid_payload(e.body_text()))?;
    state
        .validator
        .authorize(Operation::LessonListByGroup, caller(&principal))
        .await?;

    Ok(ApiResponse::success(state.lessons.lessons_by_group(&group).await?))
}
