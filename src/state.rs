use std::sync::Arc;

use crate::cache::{EntityCache, MapCache, TtlCache};
use crate::config::{CacheConfig, SecurityConfig};
use crate::database::models::{Activity, Lesson, LessonPlan};
use crate::database::{HealthCheck, Repositories};
use crate::identity::IdentityService;
use crate::services::{ActivityService, LessonPlanService, LessonService};
use crate::validation::AccessValidator;

/// One read-through cache per entity type.
/// Lesson plans are cached as bare rows; their link ids are always read from storage.
#[derive(Clone)]
pub struct Caches {
    pub lessons: Arc<dyn EntityCache<Lesson>>,
    pub lesson_plans: Arc<dyn EntityCache<LessonPlan>>,
    pub activities: Arc<dyn EntityCache<Activity>>,
}

impl Caches {
    pub fn ttl(config: &CacheConfig) -> Self {
        Self {
            lessons: Arc::new(TtlCache::<Lesson>::from_config("lessons", config)),
            lesson_plans: Arc::new(TtlCache::<LessonPlan>::from_config("lesson_plans", config)),
            activities: Arc::new(TtlCache::<Activity>::from_config("activities", config)),
        }
    }

    /// Maps without expiry, for tests
    pub fn unbounded() -> Self {
        Self {
            lessons: Arc::new(MapCache::<Lesson>::default()),
            lesson_plans: Arc::new(MapCache::<LessonPlan>::default()),
            activities: Arc::new(MapCache::<Activity>::default()),
        }
    }
}

/// Everything the handlers share
#[derive(Clone)]
pub struct AppState {
    pub lessons: LessonService,
    pub lesson_plans: LessonPlanService,
    pub activities: ActivityService,
    pub validator: AccessValidator,
    pub caches: Caches,
    pub health: Arc<dyn HealthCheck>,
    pub security: Arc<SecurityConfig>,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        identity: Arc<dyn IdentityService>,
        caches: Caches,
        security: SecurityConfig,
    ) -> Self {
        Self {
            lessons: LessonService::new(repos.lessons.clone(), repos.lesson_links.clone()),
            lesson_plans: LessonPlanService::new(
                repos.lesson_plans.clone(),
                repos.lesson_links.clone(),
                repos.activity_links.clone(),
            ),
            activities: ActivityService::new(repos.activities.clone(), repos.activity_links.clone()),
            validator: AccessValidator::new(identity),
            caches,
            health: repos.health,
            security: Arc::new(security),
        }
    }
}
