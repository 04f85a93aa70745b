pub mod activity_service;
pub mod lesson_plan_service;
pub mod lesson_service;
pub mod reconcile;

pub use activity_service::ActivityService;
pub use lesson_plan_service::LessonPlanService;
pub use lesson_service::LessonService;
pub use reconcile::{diff, reconcile, LinkStore, ReconcileReport};

use thiserror::Error;

use crate::database::DatabaseError;
use crate::identity::IdentityError;

/// Failures surfaced by the entity services and the access validator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AccessDenied(String),

    #[error("{0}")]
    InvalidPayload(String),

    #[error("Identity lookup failed: {0}")]
    Identity(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<IdentityError> for ServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotFound(_) => ServiceError::NotFound(err.to_string()),
            other => ServiceError::Identity(other.to_string()),
        }
    }
}
