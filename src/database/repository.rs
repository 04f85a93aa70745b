use std::sync::Arc;

use async_trait::async_trait;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::memory::{MemoryActivities, MemoryHealth, MemoryLessonPlans, MemoryLessons, MemoryLinks};
use crate::database::models::{
    Activity, ActivityPayload, Lesson, LessonPayload, LessonPlan, LessonPlanPayload, Link, LinkKind,
};
use crate::database::postgres::{PgActivities, PgLessonPlans, PgLessons, PgLinks};

/// Key-based storage for one entity type.
/// `P` is the request payload the entity is written from.
#[async_trait]
pub trait EntityRepository<T, P>: Send + Sync
where
    T: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    /// Insert a new row; the store assigns id and timestamps
    async fn insert(&self, payload: &P) -> Result<T, DatabaseError>;

    /// Full overwrite of an existing row. Returns `None` when no row has `id`.
    async fn update(&self, id: i64, payload: &P) -> Result<Option<T>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError>;

    async fn find_all(&self) -> Result<Vec<T>, DatabaseError>;

    /// Returns whether a row was removed
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

#[async_trait]
pub trait LessonRepository: EntityRepository<Lesson, LessonPayload> {
    async fn find_by_course(&self, course: &str) -> Result<Vec<Lesson>, DatabaseError>;
}

pub type LessonPlanRepository = dyn EntityRepository<LessonPlan, LessonPlanPayload>;
pub type ActivityRepository = dyn EntityRepository<Activity, ActivityPayload>;

/// Foreign-key queries over one lesson-plan join table
#[async_trait]
pub trait LinkRepository: Send + Sync {
    async fn find_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<Vec<Link>, DatabaseError>;

    async fn find_by_related(&self, related_id: i64) -> Result<Vec<Link>, DatabaseError>;

    async fn find_one(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError>;

    /// Insert a link. Returns `None` when the pair already exists.
    async fn insert(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError>;

    async fn delete(&self, link_id: i64) -> Result<bool, DatabaseError>;

    async fn delete_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<u64, DatabaseError>;

    async fn delete_by_related(&self, related_id: i64) -> Result<u64, DatabaseError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), DatabaseError>;
}

/// Every store the services need, behind trait objects
#[derive(Clone)]
pub struct Repositories {
    pub lessons: Arc<dyn LessonRepository>,
    pub lesson_plans: Arc<LessonPlanRepository>,
    pub activities: Arc<ActivityRepository>,
    pub lesson_links: Arc<dyn LinkRepository>,
    pub activity_links: Arc<dyn LinkRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    pub fn postgres(manager: Arc<DatabaseManager>) -> Self {
        let pool = manager.pool().clone();
        Self {
            lessons: Arc::new(PgLessons::new(pool.clone())),
            lesson_plans: Arc::new(PgLessonPlans::new(pool.clone())),
            activities: Arc::new(PgActivities::new(pool.clone())),
            lesson_links: Arc::new(PgLinks::new(LinkKind::LessonPlanLesson, pool.clone())),
            activity_links: Arc::new(PgLinks::new(LinkKind::LessonPlanActivity, pool)),
            health: manager,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            lessons: Arc::new(MemoryLessons::default()),
            lesson_plans: Arc::new(MemoryLessonPlans::default()),
            activities: Arc::new(MemoryActivities::default()),
            lesson_links: Arc::new(MemoryLinks::default()),
            activity_links: Arc::new(MemoryLinks::default()),
            health: Arc::new(MemoryHealth),
        }
    }
}
