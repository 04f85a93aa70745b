use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Activity, ActivityPayload, Lesson, LessonPayload, LessonPlan, LessonPlanPayload, Link, LinkKind,
};
use crate::database::repository::{EntityRepository, LessonRepository, LinkRepository};

const LESSON_COLUMNS: &str = "id, created_at, updated_at, course, unit, title, text, required";

const LESSON_PLAN_COLUMNS: &str = "id, created_at, updated_at, title, summary, objective, content, \
     schedule, equipment, instructor_actions, student_actions, completion_standards, presentable";

const ACTIVITY_COLUMNS: &str = "id, created_at, updated_at, title, activity_type, duration, reference_id";

pub struct PgLessons {
    pool: PgPool,
}

impl PgLessons {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Lesson, LessonPayload> for PgLessons {
    async fn insert(&self, payload: &LessonPayload) -> Result<Lesson, DatabaseError> {
        let sql = format!(
            "INSERT INTO lesson (course, unit, title, text, required) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            LESSON_COLUMNS
        );
        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(&payload.course)
            .bind(payload.chapter)
            .bind(&payload.title)
            .bind(&payload.text)
            .bind(payload.required)
            .fetch_one(&self.pool)
            .await?;
        Ok(lesson)
    }

    async fn update(&self, id: i64, payload: &LessonPayload) -> Result<Option<Lesson>, DatabaseError> {
        let sql = format!(
            "UPDATE lesson SET course = $2, unit = $3, title = $4, text = $5, required = $6, updated_at = now() \
             WHERE id = $1 RETURNING {}",
            LESSON_COLUMNS
        );
        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .bind(&payload.course)
            .bind(payload.chapter)
            .bind(&payload.title)
            .bind(&payload.text)
            .bind(payload.required)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lesson)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Lesson>, DatabaseError> {
        let sql = format!("SELECT {} FROM lesson WHERE id = $1", LESSON_COLUMNS);
        let lesson = sqlx::query_as::<_, Lesson>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(lesson)
    }

    async fn find_all(&self) -> Result<Vec<Lesson>, DatabaseError> {
        let sql = format!("SELECT {} FROM lesson ORDER BY id", LESSON_COLUMNS);
        let lessons = sqlx::query_as::<_, Lesson>(&sql).fetch_all(&self.pool).await?;
        Ok(lessons)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM lesson WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LessonRepository for PgLessons {
    async fn find_by_course(&self, course: &str) -> Result<Vec<Lesson>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM lesson WHERE course = $1 ORDER BY unit, id",
            LESSON_COLUMNS
        );
        let lessons = sqlx::query_as::<_, Lesson>(&sql)
            .bind(course)
            .fetch_all(&self.pool)
            .await?;
        Ok(lessons)
    }
}

pub struct PgLessonPlans {
    pool: PgPool,
}

impl PgLessonPlans {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<LessonPlan, LessonPlanPayload> for PgLessonPlans {
    async fn insert(&self, payload: &LessonPlanPayload) -> Result<LessonPlan, DatabaseError> {
        let sql = format!(
            "INSERT INTO lesson_plan (title, summary, objective, content, schedule, equipment, \
             instructor_actions, student_actions, completion_standards, presentable) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            LESSON_PLAN_COLUMNS
        );
        let plan = sqlx::query_as::<_, LessonPlan>(&sql)
            .bind(&payload.title)
            .bind(&payload.summary)
            .bind(&payload.objective)
            .bind(&payload.content)
            .bind(&payload.schedule)
            .bind(&payload.equipment)
            .bind(&payload.instructor_actions)
            .bind(&payload.student_actions)
            .bind(&payload.completion_standards)
            .bind(payload.presentable)
            .fetch_one(&self.pool)
            .await?;
        Ok(plan)
    }

    async fn update(&self, id: i64, payload: &LessonPlanPayload) -> Result<Option<LessonPlan>, DatabaseError> {
        let sql = format!(
            "UPDATE lesson_plan SET title = $2, summary = $3, objective = $4, content = $5, schedule = $6, \
             equipment = $7, instructor_actions = $8, student_actions = $9, completion_standards = $10, \
             presentable = $11, updated_at = now() WHERE id = $1 RETURNING {}",
            LESSON_PLAN_COLUMNS
        );
        let plan = sqlx::query_as::<_, LessonPlan>(&sql)
            .bind(id)
            .bind(&payload.title)
            .bind(&payload.summary)
            .bind(&payload.objective)
            .bind(&payload.content)
            .bind(&payload.schedule)
            .bind(&payload.equipment)
            .bind(&payload.instructor_actions)
            .bind(&payload.student_actions)
            .bind(&payload.completion_standards)
            .bind(payload.presentable)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plan)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LessonPlan>, DatabaseError> {
        let sql = format!("SELECT {} FROM lesson_plan WHERE id = $1", LESSON_PLAN_COLUMNS);
        let plan = sqlx::query_as::<_, LessonPlan>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(plan)
    }

    async fn find_all(&self) -> Result<Vec<LessonPlan>, DatabaseError> {
        let sql = format!("SELECT {} FROM lesson_plan ORDER BY id", LESSON_PLAN_COLUMNS);
        let plans = sqlx::query_as::<_, LessonPlan>(&sql).fetch_all(&self.pool).await?;
        Ok(plans)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM lesson_plan WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

pub struct PgActivities {
    pool: PgPool,
}

impl PgActivities {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityRepository<Activity, ActivityPayload> for PgActivities {
    async fn insert(&self, payload: &ActivityPayload) -> Result<Activity, DatabaseError> {
        let sql = format!(
            "INSERT INTO activity (title, activity_type, duration, reference_id) VALUES ($1, $2, $3, $4) RETURNING {}",
            ACTIVITY_COLUMNS
        );
        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(&payload.title)
            .bind(&payload.activity_type)
            .bind(payload.duration)
            .bind(payload.reference_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn update(&self, id: i64, payload: &ActivityPayload) -> Result<Option<Activity>, DatabaseError> {
        let sql = format!(
            "UPDATE activity SET title = $2, activity_type = $3, duration = $4, reference_id = $5, \
             updated_at = now() WHERE id = $1 RETURNING {}",
            ACTIVITY_COLUMNS
        );
        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(id)
            .bind(&payload.title)
            .bind(&payload.activity_type)
            .bind(payload.duration)
            .bind(payload.reference_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, DatabaseError> {
        let sql = format!("SELECT {} FROM activity WHERE id = $1", ACTIVITY_COLUMNS);
        let activity = sqlx::query_as::<_, Activity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(activity)
    }

    async fn find_all(&self) -> Result<Vec<Activity>, DatabaseError> {
        let sql = format!("SELECT {} FROM activity ORDER BY id", ACTIVITY_COLUMNS);
        let activities = sqlx::query_as::<_, Activity>(&sql).fetch_all(&self.pool).await?;
        Ok(activities)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM activity WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Join-table queries. Table and column names come from `LinkKind`, never from input.
pub struct PgLinks {
    kind: LinkKind,
    pool: PgPool,
}

impl PgLinks {
    pub fn new(kind: LinkKind, pool: PgPool) -> Self {
        Self { kind, pool }
    }

    fn select_sql(&self, filter: &str) -> String {
        format!(
            "SELECT id, created_at, updated_at, lesson_plan_id, {col} AS related_id FROM {table} WHERE {filter} ORDER BY id",
            col = self.kind.related_column(),
            table = self.kind.table(),
            filter = filter,
        )
    }
}

#[async_trait]
impl LinkRepository for PgLinks {
    async fn find_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<Vec<Link>, DatabaseError> {
        let sql = self.select_sql("lesson_plan_id = $1");
        let links = sqlx::query_as::<_, Link>(&sql)
            .bind(lesson_plan_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }

    async fn find_by_related(&self, related_id: i64) -> Result<Vec<Link>, DatabaseError> {
        let sql = self.select_sql(&format!("{} = $1", self.kind.related_column()));
        let links = sqlx::query_as::<_, Link>(&sql)
            .bind(related_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }

    async fn find_one(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
        let sql = self.select_sql(&format!("lesson_plan_id = $1 AND {} = $2", self.kind.related_column()));
        let link = sqlx::query_as::<_, Link>(&sql)
            .bind(lesson_plan_id)
            .bind(related_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn insert(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
        let sql = format!(
            "INSERT INTO {table} (lesson_plan_id, {col}) VALUES ($1, $2) \
             ON CONFLICT (lesson_plan_id, {col}) DO NOTHING \
             RETURNING id, created_at, updated_at, lesson_plan_id, {col} AS related_id",
            table = self.kind.table(),
            col = self.kind.related_column(),
        );
        let link = sqlx::query_as::<_, Link>(&sql)
            .bind(lesson_plan_id)
            .bind(related_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    async fn delete(&self, link_id: i64) -> Result<bool, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.kind.table());
        let result = sqlx::query(&sql).bind(link_id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<u64, DatabaseError> {
        let sql = format!("DELETE FROM {} WHERE lesson_plan_id = $1", self.kind.table());
        let result = sqlx::query(&sql).bind(lesson_plan_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_by_related(&self, related_id: i64) -> Result<u64, DatabaseError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = $1",
            self.kind.table(),
            self.kind.related_column()
        );
        let result = sqlx::query(&sql).bind(related_id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_links(kind: LinkKind) -> PgLinks {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/lessons")
            .unwrap();
        PgLinks::new(kind, pool)
    }

    #[tokio::test]
    async fn link_queries_use_table_for_kind() {
        let links = lazy_links(LinkKind::LessonPlanActivity);
        let sql = links.select_sql("lesson_plan_id = $1");
        assert!(sql.contains("FROM lesson_plan_activity"));
        assert!(sql.contains("activity_id AS related_id"));
    }
}
