use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlan {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub title: String,
    pub summary: String,
    pub objective: Option<String>,
    pub content: Option<String>,
    pub schedule: Option<String>,
    pub equipment: Option<String>,
    pub instructor_actions: Option<String>,
    pub student_actions: Option<String>,
    pub completion_standards: Option<String>,
    pub presentable: bool,
}

/// Lesson plan as returned over the API, with its linked lesson and activity ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanView {
    #[serde(flatten)]
    pub plan: LessonPlan,
    pub lesson_ids: Vec<i64>,
    pub activity_ids: Vec<i64>,
}

/// Request body for POST/PUT /lessonplans.
///
/// `lesson_ids` and `activity_ids` are the desired association sets on PUT.
/// Omitting a list leaves those links as they are; an empty list removes them all.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonPlanPayload {
    pub id: Option<i64>,
    pub title: String,
    pub summary: String,
    pub objective: Option<String>,
    pub content: Option<String>,
    pub schedule: Option<String>,
    pub equipment: Option<String>,
    pub instructor_actions: Option<String>,
    pub student_actions: Option<String>,
    pub completion_standards: Option<String>,
    #[serde(default)]
    pub presentable: bool,
    pub lesson_ids: Option<Vec<i64>>,
    pub activity_ids: Option<Vec<i64>>,
}
