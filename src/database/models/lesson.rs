use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single lesson within a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub course: String,
    #[sqlx(rename = "unit")]
    pub chapter: i64,
    pub title: Option<String>,
    pub text: Option<String>,
    pub required: bool,
}

/// Request body for POST/PUT /lessons. Timestamps sent by clients are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPayload {
    pub id: Option<i64>,
    pub course: String,
    pub chapter: i64,
    pub title: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub required: bool,
}
