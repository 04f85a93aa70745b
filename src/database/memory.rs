//! In-process stores with the same contracts as the Postgres repositories.
//! Used by the test suite and by `serve --in-memory`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    Activity, ActivityPayload, Lesson, LessonPayload, LessonPlan, LessonPlanPayload, Link,
};
use crate::database::repository::{EntityRepository, HealthCheck, LessonRepository, LinkRepository};

/// Id-keyed rows plus an identity sequence starting at 1
struct Table<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<T: Clone> Table<T> {
    async fn insert_with(&self, build: impl FnOnce(i64, DateTime<Utc>) -> T) -> T {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let row = build(id, Utc::now());
        self.rows.write().await.insert(id, row.clone());
        row
    }

    async fn update_with(&self, id: i64, apply: impl FnOnce(&mut T, DateTime<Utc>)) -> Option<T> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&id)?;
        apply(row, Utc::now());
        Some(row.clone())
    }

    async fn get(&self, id: i64) -> Option<T> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn all(&self) -> Vec<T> {
        self.rows.read().await.values().cloned().collect()
    }

    async fn remove(&self, id: i64) -> bool {
        self.rows.write().await.remove(&id).is_some()
    }
}

#[derive(Default)]
pub struct MemoryLessons {
    table: Table<Lesson>,
}

#[async_trait]
impl EntityRepository<Lesson, LessonPayload> for MemoryLessons {
    async fn insert(&self, payload: &LessonPayload) -> Result<Lesson, DatabaseError> {
        let lesson = self
            .table
            .insert_with(|id, now| Lesson {
                id,
                created_at: now,
                updated_at: now,
                course: payload.course.clone(),
                chapter: payload.chapter,
                title: payload.title.clone(),
                text: payload.text.clone(),
                required: payload.required,
            })
            .await;
        Ok(lesson)
    }

    async fn update(&self, id: i64, payload: &LessonPayload) -> Result<Option<Lesson>, DatabaseError> {
        let lesson = self
            .table
            .update_with(id, |lesson, now| {
                lesson.updated_at = now;
                lesson.course = payload.course.clone();
                lesson.chapter = payload.chapter;
                lesson.title = payload.title.clone();
                lesson.text = payload.text.clone();
                lesson.required = payload.required;
            })
            .await;
        Ok(lesson)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Lesson>, DatabaseError> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<Lesson>, DatabaseError> {
        Ok(self.table.all().await)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.remove(id).await)
    }
}

#[async_trait]
impl LessonRepository for MemoryLessons {
    async fn find_by_course(&self, course: &str) -> Result<Vec<Lesson>, DatabaseError> {
        let mut lessons: Vec<Lesson> = self
            .table
            .all()
            .await
            .into_iter()
            .filter(|lesson| lesson.course == course)
            .collect();
        lessons.sort_by_key(|lesson| (lesson.chapter, lesson.id));
        Ok(lessons)
    }
}

#[derive(Default)]
pub struct MemoryLessonPlans {
    table: Table<LessonPlan>,
}

#[async_trait]
impl EntityRepository<LessonPlan, LessonPlanPayload> for MemoryLessonPlans {
    async fn insert(&self, payload: &LessonPlanPayload) -> Result<LessonPlan, DatabaseError> {
        let plan = self
            .table
            .insert_with(|id, now| LessonPlan {
                id,
                created_at: now,
                updated_at: now,
                title: payload.title.clone(),
                summary: payload.summary.clone(),
                objective: payload.objective.clone(),
                content: payload.content.clone(),
                schedule: payload.schedule.clone(),
                equipment: payload.equipment.clone(),
                instructor_actions: payload.instructor_actions.clone(),
                student_actions: payload.student_actions.clone(),
                completion_standards: payload.completion_standards.clone(),
                presentable: payload.presentable,
            })
            .await;
        Ok(plan)
    }

    async fn update(&self, id: i64, payload: &LessonPlanPayload) -> Result<Option<LessonPlan>, DatabaseError> {
        let plan = self
            .table
            .update_with(id, |plan, now| {
                plan.updated_at = now;
                plan.title = payload.title.clone();
                plan.summary = payload.summary.clone();
                plan.objective = payload.objective.clone();
                plan.content = payload.content.clone();
                plan.schedule = payload.schedule.clone();
                plan.equipment = payload.equipment.clone();
                plan.instructor_actions = payload.instructor_actions.clone();
                plan.student_actions = payload.student_actions.clone();
                plan.completion_standards = payload.completion_standards.clone();
                plan.presentable = payload.presentable;
            })
            .await;
        Ok(plan)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<LessonPlan>, DatabaseError> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<LessonPlan>, DatabaseError> {
        Ok(self.table.all().await)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.remove(id).await)
    }
}

#[derive(Default)]
pub struct MemoryActivities {
    table: Table<Activity>,
}

#[async_trait]
impl EntityRepository<Activity, ActivityPayload> for MemoryActivities {
    async fn insert(&self, payload: &ActivityPayload) -> Result<Activity, DatabaseError> {
        let activity = self
            .table
            .insert_with(|id, now| Activity {
                id,
                created_at: now,
                updated_at: now,
                title: payload.title.clone(),
                activity_type: payload.activity_type.clone(),
                duration: payload.duration,
                reference_id: payload.reference_id,
            })
            .await;
        Ok(activity)
    }

    async fn update(&self, id: i64, payload: &ActivityPayload) -> Result<Option<Activity>, DatabaseError> {
        let activity = self
            .table
            .update_with(id, |activity, now| {
                activity.updated_at = now;
                activity.title = payload.title.clone();
                activity.activity_type = payload.activity_type.clone();
                activity.duration = payload.duration;
                activity.reference_id = payload.reference_id;
            })
            .await;
        Ok(activity)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Activity>, DatabaseError> {
        Ok(self.table.get(id).await)
    }

    async fn find_all(&self) -> Result<Vec<Activity>, DatabaseError> {
        Ok(self.table.all().await)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.remove(id).await)
    }
}

/// One join table; the (lesson_plan_id, related_id) pair is unique
#[derive(Default)]
pub struct MemoryLinks {
    table: Table<Link>,
}

impl MemoryLinks {

    async fn matching(&self, predicate: impl Fn(&Link) -> bool) -> Vec<Link> {
        self.table
            .rows
            .read()
            .await
            .values()
            .filter(|link| predicate(link))
            .cloned()
            .collect()
    }

    async fn remove_matching(&self, predicate: impl Fn(&Link) -> bool) -> u64 {
        let mut rows = self.table.rows.write().await;
        let before = rows.len();
        rows.retain(|_, link| !predicate(link));
        (before - rows.len()) as u64
    }
}

#[async_trait]
impl LinkRepository for MemoryLinks {
    async fn find_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<Vec<Link>, DatabaseError> {
        Ok(self.matching(|link| link.lesson_plan_id == lesson_plan_id).await)
    }

    async fn find_by_related(&self, related_id: i64) -> Result<Vec<Link>, DatabaseError> {
        Ok(self.matching(|link| link.related_id == related_id).await)
    }

    async fn find_one(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
        let found = self
            .matching(|link| link.lesson_plan_id == lesson_plan_id && link.related_id == related_id)
            .await;
        Ok(found.into_iter().next())
    }

    async fn insert(&self, lesson_plan_id: i64, related_id: i64) -> Result<Option<Link>, DatabaseError> {
        // Check and insert under one write lock so the pair stays unique
        let mut rows = self.table.rows.write().await;
        if rows
            .values()
            .any(|link| link.lesson_plan_id == lesson_plan_id && link.related_id == related_id)
        {
            return Ok(None);
        }
        let id = self.table.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let link = Link {
            id,
            created_at: now,
            updated_at: now,
            lesson_plan_id,
            related_id,
        };
        rows.insert(id, link.clone());
        Ok(Some(link))
    }

    async fn delete(&self, link_id: i64) -> Result<bool, DatabaseError> {
        Ok(self.table.remove(link_id).await)
    }

    async fn delete_by_lesson_plan(&self, lesson_plan_id: i64) -> Result<u64, DatabaseError> {
        Ok(self.remove_matching(|link| link.lesson_plan_id == lesson_plan_id).await)
    }

    async fn delete_by_related(&self, related_id: i64) -> Result<u64, DatabaseError> {
        Ok(self.remove_matching(|link| link.related_id == related_id).await)
    }
}

pub struct MemoryHealth;

#[async_trait]
impl HealthCheck for MemoryHealth {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
