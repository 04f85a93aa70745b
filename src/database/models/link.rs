use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Which many-to-many join table a link lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `lesson_plan_lesson`
    LessonPlanLesson,
    /// `lesson_plan_activity`
    LessonPlanActivity,
}

impl LinkKind {
    pub fn table(self) -> &'static str {
        match self {
            LinkKind::LessonPlanLesson => "lesson_plan_lesson",
            LinkKind::LessonPlanActivity => "lesson_plan_activity",
        }
    }

    pub fn related_column(self) -> &'static str {
        match self {
            LinkKind::LessonPlanLesson => "lesson_id",
            LinkKind::LessonPlanActivity => "activity_id",
        }
    }
}

/// One join row. `related_id` is the lesson id or the activity id depending on the table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Link {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lesson_plan_id: i64,
    pub related_id: i64,
}
