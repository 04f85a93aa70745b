use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth::decode_jwt;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller name taken from the bearer token's `sub` claim
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Attach a `Principal` to the request when a bearer token is present.
///
/// Requests without an Authorization header pass through anonymously and are
/// refused later by the access validator. A header that is present but does
/// not hold a valid token is rejected here with 401.
pub async fn principal_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    match extract_jwt_from_headers(&headers) {
        Ok(None) => {}
        Ok(Some(token)) => match decode_jwt(&token, &state.security.jwt_secret) {
            Ok(claims) => {
                request.extensions_mut().insert(Principal::new(claims.sub));
            }
            Err(e) => {
                tracing::warn!("Rejected bearer token: {}", e);
                return ApiError::unauthorized(e.to_string()).into_response();
            }
        },
        Err(msg) => return ApiError::unauthorized(msg).into_response(),
    }

    next.run(request).await
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, String> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(Some(token.trim().to_string()))
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
