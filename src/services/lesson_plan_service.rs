use std::sync::Arc;

use crate::database::models::{LessonPlan, LessonPlanPayload, LessonPlanView};
use crate::database::repository::LessonPlanRepository;
use crate::database::LinkRepository;
use crate::services::reconcile::{reconcile, LinkStore, ReconcileReport};
use crate::services::ServiceError;

/// Lesson plans plus their lesson and activity link tables
#[derive(Clone)]
pub struct LessonPlanService {
    plans: Arc<LessonPlanRepository>,
    lesson_links: Arc<dyn LinkRepository>,
    activity_links: Arc<dyn LinkRepository>,
}

impl LessonPlanService {
    pub fn new(
        plans: Arc<LessonPlanRepository>,
        lesson_links: Arc<dyn LinkRepository>,
        activity_links: Arc<dyn LinkRepository>,
    ) -> Self {
        Self {
            plans,
            lesson_links,
            activity_links,
        }
    }

    /// Persist the plan fields. Link lists in the payload are not applied on create.
    pub async fn create(&self, payload: &LessonPlanPayload) -> Result<LessonPlanView, ServiceError> {
        let plan = self.plans.insert(payload).await?;
        tracing::info!(lesson_plan_id = plan.id, "Created lesson plan");
        self.with_links(plan).await
    }

    pub async fn get(&self, id: i64) -> Result<LessonPlanView, ServiceError> {
        let plan = self.get_plan(id).await?;
        self.with_links(plan).await
    }

    /// Overwrite the plan fields, then reconcile each link list the payload carries
    pub async fn update(&self, payload: &LessonPlanPayload) -> Result<LessonPlanView, ServiceError> {
        let id = payload
            .id
            .ok_or_else(|| ServiceError::InvalidPayload("Lesson plan ID is required for update".to_string()))?;
        let plan = self.plans.update(id, payload).await?.ok_or_else(|| not_found(id))?;

        if let Some(lesson_ids) = &payload.lesson_ids {
            self.link_lessons(id, lesson_ids).await?;
        }
        if let Some(activity_ids) = &payload.activity_ids {
            self.link_activities(id, activity_ids).await?;
        }

        tracing::info!(lesson_plan_id = id, "Updated lesson plan");
        self.with_links(plan).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get_plan(id).await?;
        let lessons = self.lesson_links.delete_by_lesson_plan(id).await?;
        let activities = self.activity_links.delete_by_lesson_plan(id).await?;
        if !self.plans.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(
            lesson_plan_id = id,
            unlinked_lessons = lessons,
            unlinked_activities = activities,
            "Deleted lesson plan"
        );
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<LessonPlanView>, ServiceError> {
        let plans = self.plans.find_all().await?;
        let mut views = Vec::with_capacity(plans.len());
        for plan in plans {
            views.push(self.with_links(plan).await?);
        }
        Ok(views)
    }

    pub async fn lesson_ids_for(&self, lesson_plan_id: i64) -> Result<Vec<i64>, ServiceError> {
        Ok(self.lesson_links.linked_ids(lesson_plan_id).await?)
    }

    pub async fn activity_ids_for(&self, lesson_plan_id: i64) -> Result<Vec<i64>, ServiceError> {
        Ok(self.activity_links.linked_ids(lesson_plan_id).await?)
    }

    pub async fn link_lessons(&self, lesson_plan_id: i64, lesson_ids: &[i64]) -> Result<ReconcileReport, ServiceError> {
        Ok(reconcile(self.lesson_links.as_ref(), lesson_plan_id, lesson_ids).await?)
    }

    pub async fn link_activities(
        &self,
        lesson_plan_id: i64,
        activity_ids: &[i64],
    ) -> Result<ReconcileReport, ServiceError> {
        Ok(reconcile(self.activity_links.as_ref(), lesson_plan_id, activity_ids).await?)
    }

    /// The stored plan row without its links
    pub async fn get_plan(&self, id: i64) -> Result<LessonPlan, ServiceError> {
        self.plans.find_by_id(id).await?.ok_or_else(|| not_found(id))
    }

    /// Attach the current lesson and activity ids to `plan`
    pub async fn with_links(&self, plan: LessonPlan) -> Result<LessonPlanView, ServiceError> {
        let lesson_ids = self.lesson_ids_for(plan.id).await?;
        let activity_ids = self.activity_ids_for(plan.id).await?;
        Ok(LessonPlanView {
            plan,
            lesson_ids,
            activity_ids,
        })
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("No lesson plan found for ID [{}]", id))
}
