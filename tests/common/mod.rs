#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use lessons_api::auth::generate_jwt;
use lessons_api::config::SecurityConfig;
use lessons_api::database::Repositories;
use lessons_api::identity::StaticIdentityService;
use lessons_api::types::Role;
use lessons_api::{app, AppState, Caches};

pub const SECRET: &str = "integration-secret";

pub const ADMIN: &str = "ada";
pub const INSTRUCTOR: &str = "ivan";
pub const STUDENT: &str = "sam";

/// Router over in-memory storage with a fixed user directory
pub struct TestApp {
    router: Router,
    pub repos: Repositories,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repos(Repositories::in_memory())
    }

    /// Same wiring over caller-supplied stores
    pub fn with_repos(repos: Repositories) -> Self {
        let directory = StaticIdentityService::new()
            .with_user(ADMIN, 1, Role::Admin)
            .with_user(INSTRUCTOR, 2, Role::Instructor)
            .with_user(STUDENT, 3, Role::Student);
        let security = SecurityConfig {
            cors_origins: Vec::new(),
            jwt_secret: SECRET.to_string(),
        };
        let state = AppState::new(repos.clone(), Arc::new(directory), Caches::unbounded(), security);
        Self {
            router: app(state),
            repos,
        }
    }

    /// Send one request as `user` (anonymous when `None`) and return status plus JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token(user)?));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };
        self.raw(request).await
    }

    pub async fn raw(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).with_context(|| format!("non-JSON body: {:?}", bytes))?
        };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, user: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, Some(user), None).await
    }

    pub async fn post(&self, uri: &str, user: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(user), Some(body)).await
    }

    pub async fn put(&self, uri: &str, user: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PUT, uri, Some(user), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, user: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(user), None).await
    }

    /// POST and return the created entity's `data`
    pub async fn create(&self, uri: &str, body: Value) -> Result<Value> {
        let (status, body) = self.post(uri, INSTRUCTOR, body).await?;
        anyhow::ensure!(status == StatusCode::CREATED, "expected 201 from {}, got {}: {}", uri, status, body);
        Ok(body["data"].clone())
    }
}

pub fn token(user: &str) -> Result<String> {
    Ok(generate_jwt(user, SECRET, chrono::Duration::hours(1))?)
}

/// Sorted integer array from a JSON list
pub fn ids(value: &Value) -> Vec<i64> {
    let mut ids: Vec<i64> = value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default();
    ids.sort();
    ids
}
