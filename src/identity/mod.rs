//! Caller identity lookup.
//!
//! The service does not own users. It asks an external identity service to
//! resolve a principal name to `{ id, role }`.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::config::IdentityConfig;
use crate::types::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("No user found for [{0}]")]
    NotFound(String),

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid identity response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve_user(&self, name: &str) -> Result<User, IdentityError>;
}

/// Resolves users with `GET {base_url}/users/{name}`
pub struct HttpIdentityService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpIdentityService {
    pub fn new(config: &IdentityConfig) -> Result<Self, IdentityError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| IdentityError::InvalidResponse(format!("bad base URL {}: {}", config.base_url, e)))?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.read_timeout())
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn user_url(&self, name: &str) -> Result<Url, IdentityError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IdentityError::InvalidResponse(format!("bad base URL {}", self.base_url)))?
            .pop_if_empty()
            .push("users")
            .push(name);
        Ok(url)
    }
}

#[async_trait]
impl IdentityService for HttpIdentityService {
    async fn resolve_user(&self, name: &str) -> Result<User, IdentityError> {
        let url = self.user_url(name)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(IdentityError::NotFound(name.to_string())),
            status if status.is_success() => response
                .json::<User>()
                .await
                .map_err(|e| IdentityError::InvalidResponse(e.to_string())),
            status => Err(IdentityError::Unavailable(format!("status {} for user {}", status, name))),
        }
    }
}

/// Fixed directory of users, for tests and local runs without an identity service
#[derive(Debug, Default, Clone)]
pub struct StaticIdentityService {
    users: HashMap<String, User>,
}

impl StaticIdentityService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, name: impl Into<String>, id: i64, role: Role) -> Self {
        self.users.insert(name.into(), User { id, role });
        self
    }

    /// Parse `name:id:role` entries separated by commas, e.g. `alice:1:admin,bob:2:student`
    pub fn parse(entries: &str) -> Result<Self, IdentityError> {
        let mut directory = Self::new();
        for entry in entries.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let parts: Vec<&str> = entry.split(':').collect();
            let [name, id, role] = parts.as_slice() else {
                return Err(IdentityError::InvalidResponse(format!("expected name:id:role, got {}", entry)));
            };
            let id = id
                .parse::<i64>()
                .map_err(|_| IdentityError::InvalidResponse(format!("bad user id in {}", entry)))?;
            let role = role
                .parse::<Role>()
                .map_err(|e| IdentityError::InvalidResponse(format!("{} in {}", e, entry)))?;
            directory = directory.with_user(*name, id, role);
        }
        Ok(directory)
    }
}

#[async_trait]
impl IdentityService for StaticIdentityService {
    async fn resolve_user(&self, name: &str) -> Result<User, IdentityError> {
        self.users
            .get(name)
            .cloned()
            .ok_or_else(|| IdentityError::NotFound(name.to_string()))
    }
}
