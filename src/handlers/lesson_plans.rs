use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Extension, Json,
};

use crate::database::models::{LessonPlanPayload, LessonPlanView};
use crate::handlers::{caller, json_body, path_id};
use crate::middleware::{ApiResponse, ApiResult, Principal};
use crate::state::AppState;
use crate::types::Operation;

/// POST /lessonplans
pub async fn create(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<LessonPlanPayload>>, JsonRejection>,
) -> ApiResult<LessonPlanView> {
    let payload = json_body(body, "lesson plan")?;
    state
        .validator
        .authorize(Operation::LessonPlanCreate, caller(&principal))
        .await?;

    let view = state.lesson_plans.create(&payload).await?;
    state.caches.lesson_plans.put(view.plan.id, view.plan.clone()).await;
    Ok(ApiResponse::created(view))
}

/// GET /lessonplans/:id
pub async fn get(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<LessonPlanView> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::LessonPlanRead, caller(&principal))
        .await?;

    let plan = match state.caches.lesson_plans.get(id).await {
        Some(plan) => plan,
        None => {
            let plan = state.lesson_plans.get_plan(id).await?;
            state.caches.lesson_plans.put(id, plan.clone()).await;
            plan
        }
    };
    Ok(ApiResponse::success(state.lesson_plans.with_links(plan).await?))
}

/// PUT /lessonplans
///
/// `lessonIds` and `activityIds`, when present, replace the plan's links.
pub async fn update(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    body: Result<Json<Option<LessonPlanPayload>>, JsonRejection>,
) -> ApiResult<LessonPlanView> {
    let payload = json_body(body, "lesson plan")?;
    state
        .validator
        .authorize(Operation::LessonPlanUpdate, caller(&principal))
        .await?;

    // The row is written before links are reconciled, so a failed reconcile still stales the cache
    if let Some(id) = payload.id {
        state.caches.lesson_plans.remove(id).await;
    }
    let view = state.lesson_plans.update(&payload).await?;
    state.caches.lesson_plans.put(view.plan.id, view.plan.clone()).await;
    Ok(ApiResponse::success(view))
}

/// DELETE /lessonplans/:id
pub async fn delete(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let id = path_id(id)?;
    state
        .validator
        .authorize(Operation::LessonPlanDelete, caller(&principal))
        .await?;

    state.lesson_plans.delete(id).await?;
    state.caches.lesson_plans.remove(id).await;
    Ok(ApiResponse::no_content())
}

/// GET /lessonplans
pub async fn list(
    State(state): State<AppState>,
    principal: Option<Extension<Principal>>,
) -> ApiResult<Vec<LessonPlanView>> {
    state
        .validator
        .authorize(Operation::LessonPlanList, caller(&principal))
        .await?;

    Ok(ApiResponse::success(state.lesson_plans.list().await?))
}
