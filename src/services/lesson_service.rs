use std::sync::Arc;

use crate::database::models::{Lesson, LessonPayload};
use crate::database::{LessonRepository, LinkRepository};
use crate::services::ServiceError;

#[derive(Clone)]
pub struct LessonService {
    lessons: Arc<dyn LessonRepository>,
    lesson_links: Arc<dyn LinkRepository>,
}

impl LessonService {
    pub fn new(lessons: Arc<dyn LessonRepository>, lesson_links: Arc<dyn LinkRepository>) -> Self {
        Self { lessons, lesson_links }
    }

    pub async fn create(&self, payload: &LessonPayload) -> Result<Lesson, ServiceError> {
        let lesson = self.lessons.insert(payload).await?;
        tracing::info!(lesson_id = lesson.id, course = %lesson.course, "Created lesson");
        Ok(lesson)
    }

    pub async fn get(&self, id: i64) -> Result<Lesson, ServiceError> {
        self.lessons
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Full overwrite of the lesson named by `payload.id`
    pub async fn update(&self, payload: &LessonPayload) -> Result<Lesson, ServiceError> {
        let id = payload
            .id
            .ok_or_else(|| ServiceError::InvalidPayload("Lesson ID is required for update".to_string()))?;
        let lesson = self.lessons.update(id, payload).await?.ok_or_else(|| not_found(id))?;
        tracing::info!(lesson_id = id, "Updated lesson");
        Ok(lesson)
    }

    /// Remove the lesson after dropping every lesson-plan link that points at it
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        self.get(id).await?;
        let unlinked = self.lesson_links.delete_by_related(id).await?;
        if !self.lessons.delete(id).await? {
            return Err(not_found(id));
        }
        tracing::info!(lesson_id = id, unlinked, "Deleted lesson");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Lesson>, ServiceError> {
        Ok(self.lessons.find_all().await?)
    }

    /// Lessons whose course is `group`, in chapter order
    pub async fn lessons_by_group(&self, group: &str) -> Result<Vec<Lesson>, ServiceError> {
        Ok(self.lessons.find_by_course(group).await?)
    }
}

fn not_found(id: i64) -> ServiceError {
    ServiceError::NotFound(format!("No lesson found for ID [{}]", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Repositories;

    fn service(repos: &Repositories) -> LessonService {
        LessonService::new(repos.lessons.clone(), repos.lesson_links.clone())
    }

    fn payload(course: &str, chapter: i64, text: &str) -> LessonPayload {
        LessonPayload {
            id: None,
            course: course.to_string(),
            chapter,
            title: None,
            text: Some(text.to_string()),
            required: true,
        }
    }

    #[tokio::test]
    async fn missing_lesson_is_not_found() {
        let repos = Repositories::in_memory();
        let err = service(&repos).get(12).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(msg) if msg == "No lesson found for ID [12]"));
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let repos = Repositories::in_memory();
        let err = service(&repos).update(&payload("PVT", 1, "intro")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn update_keeps_id_and_overwrites_fields() {
        let repos = Repositories::in_memory();
        let lessons = service(&repos);
        let created = lessons.create(&payload("PVT", 1, "intro")).await.unwrap();

        let mut revised = payload("PVT", 2, "revised");
        revised.id = Some(created.id);
        let updated = lessons.update(&revised).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.chapter, 2);
        assert_eq!(updated.text.as_deref(), Some("revised"));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_drops_plan_links_first() {
        let repos = Repositories::in_memory();
        let lessons = service(&repos);
        let lesson = lessons.create(&payload("PVT", 1, "intro")).await.unwrap();
        repos.lesson_links.insert(1, lesson.id).await.unwrap();

        lessons.delete(lesson.id).await.unwrap();

        assert!(repos.lesson_links.find_by_related(lesson.id).await.unwrap().is_empty());
        assert!(matches!(lessons.get(lesson.id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(lessons.delete(lesson.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn lessons_by_group_filters_on_course() {
        let repos = Repositories::in_memory();
        let lessons = service(&repos);
        lessons.create(&payload("PVT", 2, "b")).await.unwrap();
        lessons.create(&payload("IFR", 1, "x")).await.unwrap();
        lessons.create(&payload("PVT", 1, "a")).await.unwrap();

        let group = lessons.lessons_by_group("PVT").await.unwrap();
        let texts: Vec<_> = group.iter().filter_map(|l| l.text.as_deref()).collect();
        assert_eq!(texts, vec!["a", "b"]);
    }
}
