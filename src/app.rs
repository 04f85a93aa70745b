use axum::{
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::principal_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.security.cors_origins);

    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Role-checked resources
        .merge(lesson_routes())
        .merge(lesson_plan_routes())
        .merge(activity_routes())
        // Global middleware
        .layer(middleware::from_fn_with_state(state.clone(), principal_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn lesson_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::lessons;

    Router::new()
        .route(
            "/lessons",
            post(lessons::create).put(lessons::update).get(lessons::list),
        )
        .route("/lessons/:id", get(lessons::get).delete(lessons::delete))
        .route("/lessons/all/:group", get(lessons::by_group))
}

fn lesson_plan_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::lesson_plans;

    Router::new()
        .route(
            "/lessonplans",
            post(lesson_plans::create)
                .put(lesson_plans::update)
                .get(lesson_plans::list),
        )
        .route(
            "/lessonplans/:id",
            get(lesson_plans::get).delete(lesson_plans::delete),
        )
}

fn activity_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::activities;

    Router::new()
        .route(
            "/activities",
            post(activities::create).put(activities::update).get(activities::list),
        )
        .route("/activities/:id", get(activities::get).delete(activities::delete))
}

/// Any origin unless a list is configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}
