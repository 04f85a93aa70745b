use std::sync::Arc;

use crate::database::models::{Activity, ActivityPayload};
use crate::database::repository::ActivityRepository;
use crate::database::LinkRepository;
use crate::services::ServiceError;

#[derive(Clone)]
pub struct ActivityService {
    activities: Arc<ActivityRepository>,
    activity_links: Arc<dyn LinkRepository>,
}

impl ActivityService {
    pub fn new(activities: Arc<ActivityRepository>, activity_links: Arc<dyn LinkRepository>) -> Self {
        Self {
            activities,
            activity_links,
        }
    }

    pub async fn create(&self, payload: &ActivityPayload) -> Result<Activity, ServiceError> {
        let activity = self.activities.insert(payload).await?;
        tracing::info!(activity_id = activity.id, "Created activity");
        Ok(activity)
    }

    pub async fn get(&self, id: i64) -> Result<Activity, ServiceError> {
        self.activities
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update(&self, payload: &ActivityPayload) -> Result<Activity, ServiceError> {
        let id = payload
            .id
            .ok_or_else(|| ServiceError::InvalidPayload("Activity ID is required for update".to_string()))?;
        let activity = self
            .activities
            .update(id, payload)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(activity_id = id, "Updated activity");
        Ok(activity)
    }

    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get(id).await?;
        let unlinked = self.activity_links.delete_by_related(id).await?;
        if !self.activities.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(activity_id = id, unlinked, "Deleted activity");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Activity>, ServiceError> {
        Ok(self.activities.find_all().await?)
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("No activity found for ID [{}]", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;

    #[tokio::test]
    async fn delete_removes_links_from_every_plan() {
        let repos = Repositories::in_memory();
        let activities = ActivityService::new(repos.activities.clone(), repos.activity_links.clone());
        let activity = activities
            .create(&ActivityPayload {
                id: None,
                title: "Preflight".to_string(),
                activity_type: "ground".to_string(),
                duration: Some(30),
                reference_id: None,
            })
            .await
            .unwrap();
        repos.activity_links.insert(1, activity.id).await.unwrap();
        repos.activity_links.insert(2, activity.id).await.unwrap();

        activities.delete(activity.id).await.unwrap();

        assert!(repos.activity_links.find_by_lesson_plan(1).await.unwrap().is_empty());
        assert!(repos.activity_links.find_by_lesson_plan(2).await.unwrap().is_empty());
        assert!(activities.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_of_unknown_activity_is_not_found() {
        let repos = Repositories::in_memory();
        let activities = ActivityService::new(repos.activities.clone(), repos.activity_links.clone());
        let err = activities
            .update(&ActivityPayload {
                id: Some(404),
                title: "Solo".to_string(),
                activity_type: "flight".to_string(),
                duration: None,
                reference_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg == "No activity found for ID [404]"));
    }
}
