use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::database::models::{Activity, ActivityPayload};
use crate::handlers::{caller, json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;
use crate::types::Operation;

/// POST /activities
pub async fn create(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<ActivityPayload>>, JsonRejection>,
) -> ApiResult<Activity> {
    let payload = json_body(body, "activity")?;
    state
        .validator
        .authorize(Operation::ActivityCreate, caller(&principal))
        .await?;

    let activity = state.activities.create(&payload).await?;
    state.caches.activities.put(activity.id, activity.clone()).await;
    Ok(ApiResponse::created(activity))
}

/// GET /activities/:id
pub async fn get(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Activity> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::ActivityRead, caller(&principal))
        .await?;

    if let Some(activity) = state.caches.activities.get(id).await {
        return Ok(ApiResponse::success(activity));
    }
    let activity = state.activities.get(id).await?;
    state.caches.activities.put(id, activity.clone()).await;
    Ok(ApiResponse::success(activity))
}

/// PUT /activities
pub async fn update(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<ActivityPayload>>, JsonRejection>,
) -> ApiResult<Activity> {
    let payload = json_body(body, "activity")?;
    state
        .validator
        .authorize(Operation::ActivityUpdate, caller(&principal))
        .await?;

    let activity = state.activities.update(&payload).await?;
    state.caches.activities.put(activity.id, activity.clone()).await;
    Ok(ApiResponse::success(activity))
}

/// DELETE /activities/:id
pub async fn delete(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::ActivityDelete, caller(&principal))
        .await?;

    state.activities.delete(id).await?;
    state.caches.activities.remove(id).await;
    Ok(ApiResponse::no_content())
}

/// GET /activities
pub async fn list(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Vec<Activity>> {
    state
        .validator
        .authorize(Operation::ActivityList, caller(&principal))
        .await?;

    Ok(ApiResponse::success(state.activities.list().await?))
}
