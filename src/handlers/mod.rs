pub mod activities;
pub mod lesson_plans;
pub mod lessons;
pub mod public;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    Extension, Json,
};

use crate::error::ApiError;
use crate::middleware::Principal;
use crate::validation::{require_payload, Validate};

/// Unwrap a JSON body, treating malformed JSON, a `null` body and overlong fields as invalid payloads
pub(crate) fn json_body<T: Validate>(
    body: Result<Json<Option<T>>, JsonRejection>,
    entity: &str,
) -> Result<T, ApiError> {
    let Json(payload) = body.map_err(|e| ApiError::invalid_payload(e.body_text()))?;
    let payload = require_payload(payload, entity)?;
    payload.validate()?;
    Ok(payload)
}

pub(crate) fn path_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = id.map_err(|e| ApiError::invalid_payload(e.body_text()))?;
    Ok(id)
}

pub(crate) fn caller(principal: &Option<Extension<Principal>>) -> Option<&Principal> {
    principal.as_ref().map(|Extension(principal)| principal)
}
