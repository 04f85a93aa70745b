use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Lessons API",
            "version": version,
            "description": "Lessons, lesson plans and activities for flight training courses",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "lessons": "/lessons[/:id], /lessons/all/:group (authenticated)",
                "lessonplans": "/lessonplans[/:id] (admin, instructor)",
                "activities": "/activities[/:id] (admin, instructor)",
            }
        }
    }))
}

/// GET /health - 503 when storage does not answer
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.health.backend();

    match state.health.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok",
                    "backend": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "backend": backend,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
