//! Role-based access checks.
//!
//! Each guarded operation maps to one `Access` rule in `PERMISSIONS`. A check
//! resolves the caller through the identity service and tests the role
//! against that rule. Successful checks return the caller's user id.

use std::sync::Arc;

use crate::database::models::{ActivityPayload, LessonPayload, LessonPlanPayload};
use crate::identity::{IdentityService, User};
use crate::middleware::Principal;
use crate::services::ServiceError;
use crate::types::{Operation, Role};

const NOT_AUTHORIZED: &str = "Current user is not authorized";
const NO_AUTHORIZATION: &str = "No authorization provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    AdminOnly,
    AdminOrInstructor,
    AnyAuthenticated,
}

impl Access {
    pub fn roles(self) -> &'static [Role] {
        match self {
            Access::AdminOnly => &[Role::Admin],
            Access::AdminOrInstructor => &[Role::Admin, Role::Instructor],
            Access::AnyAuthenticated => &[Role::Admin, Role::Instructor, Role::Student],
        }
    }

    pub fn allows(self, role: Role) -> bool {
        self.roles().contains(&role)
    }
}

pub const PERMISSIONS: &[(Operation, Access)] = &[
    (Operation::LessonCreate, Access::AdminOrInstructor),
    (Operation::LessonRead, Access::AnyAuthenticated),
    (Operation::LessonUpdate, Access::AdminOrInstructor),
    (Operation::LessonDelete, Access::AdminOrInstructor),
    (Operation::LessonList, Access::AdminOrInstructor),
    (Operation::LessonListByGroup, Access::AnyAuthenticated),
    (Operation::LessonPlanCreate, Access::AdminOrInstructor),
    (Operation::LessonPlanRead, Access::AdminOrInstructor),
    (Operation::LessonPlanUpdate, Access::AdminOrInstructor),
    (Operation::LessonPlanDelete, Access::AdminOrInstructor),
    (Operation::LessonPlanList, Access::AdminOrInstructor),
    (Operation::ActivityCreate, Access::AdminOrInstructor),
    (Operation::ActivityRead, Access::AdminOrInstructor),
    (Operation::ActivityUpdate, Access::AdminOrInstructor),
    (Operation::ActivityDelete, Access::AdminOrInstructor),
    (Operation::ActivityList, Access::AdminOrInstructor),
];

/// `None` for an operation missing from the table, which is always denied
pub fn access_for(operation: Operation) -> Option<Access> {
    PERMISSIONS
        .iter()
        .find(|(op, _)| *op == operation)
        .map(|(_, access)| *access)
}

/// Fail with `InvalidPayload` when the request carried no body for `entity`
pub fn require_payload<T>(payload: Option<T>, entity: &str) -> Result<T, ServiceError> {
    payload.ok_or_else(|| {
        let msg = format!("No {} information was provided", entity);
        tracing::warn!("{}", msg);
        ServiceError::InvalidPayload(msg)
    })
}

/// Field checks on a request body, matching the column limits of the schema
pub trait Validate {
    fn validate(&self) -> Result<(), ServiceError>;
}

const TITLE_MAX: usize = 255;
const COURSE_MAX: usize = 500;
const LESSON_TEXT_MAX: usize = 4000;
const PLAN_TEXT_MAX: usize = 2000;

fn max_len(entity: &str, field: &str, value: Option<&str>, limit: usize) -> Result<(), ServiceError> {
    match value {
        Some(value) if value.chars().count() > limit => {
            let msg = format!("{} {} must be at most {} characters", entity, field, limit);
            tracing::warn!("{}", msg);
            Err(ServiceError::InvalidPayload(msg))
        }
        _ => Ok(()),
    }
}

impl Validate for LessonPayload {
    fn validate(&self) -> Result<(), ServiceError> {
        max_len("Lesson", "course", Some(&self.course), COURSE_MAX)?;
        max_len("Lesson", "title", self.title.as_deref(), TITLE_MAX)?;
        max_len("Lesson", "text", self.text.as_deref(), LESSON_TEXT_MAX)
    }
}

impl Validate for LessonPlanPayload {
    fn validate(&self) -> Result<(), ServiceError> {
        max_len("Lesson plan", "title", Some(&self.title), TITLE_MAX)?;
        let fields = [
            ("summary", Some(self.summary.as_str())),
            ("objective", self.objective.as_deref()),
            ("content", self.content.as_deref()),
            ("schedule", self.schedule.as_deref()),
            ("equipment", self.equipment.as_deref()),
            ("instructorActions", self.instructor_actions.as_deref()),
            ("studentActions", self.student_actions.as_deref()),
            ("completionStandards", self.completion_standards.as_deref()),
        ];
        for (field, value) in fields {
            max_len("Lesson plan", field, value, PLAN_TEXT_MAX)?;
        }
        Ok(())
    }
}

impl Validate for ActivityPayload {
    fn validate(&self) -> Result<(), ServiceError> {
        max_len("Activity", "title", Some(&self.title), TITLE_MAX)?;
        max_len("Activity", "activityType", Some(&self.activity_type), TITLE_MAX)
    }
}

#[derive(Clone)]
pub struct AccessValidator {
    identity: Arc<dyn IdentityService>,
}

impl AccessValidator {
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Check the caller against the rule for `operation`
    pub async fn authorize(&self, operation: Operation, principal: Option<&Principal>) -> Result<i64, ServiceError> {
        let Some(access) = access_for(operation) else {
            tracing::warn!(?operation, "No access rule for operation");
            return Err(ServiceError::AccessDenied(NOT_AUTHORIZED.to_string()));
        };
        self.check(access, principal).await
    }

    pub async fn check(&self, access: Access, principal: Option<&Principal>) -> Result<i64, ServiceError> {
        let user = self.current_user(principal).await?;
        if !access.allows(user.role) {
            tracing::warn!(?access, role = %user.role, user_id = user.id, "{}", NOT_AUTHORIZED);
            return Err(ServiceError::AccessDenied(NOT_AUTHORIZED.to_string()));
        }
        Ok(user.id)
    }

    /// Admins and instructors, or the caller whose id is `user_id`
    pub async fn access_admin_instructor_or_user(
        &self,
        user_id: i64,
        principal: Option<&Principal>,
    ) -> Result<i64, ServiceError> {
        let user = self.current_user(principal).await?;
        if !Access::AdminOrInstructor.allows(user.role) && user.id != user_id {
            tracing::warn!(role = %user.role, user_id, caller_id = user.id, "{}", NOT_AUTHORIZED);
            return Err(ServiceError::AccessDenied(NOT_AUTHORIZED.to_string()));
        }
        Ok(user.id)
    }

    pub async fn is_admin(&self, principal: Option<&Principal>) -> bool {
        self.check(Access::AdminOnly, principal).await.is_ok()
    }

    pub async fn is_admin_or_instructor(&self, principal: Option<&Principal>) -> bool {
        self.check(Access::AdminOrInstructor, principal).await.is_ok()
    }

    /// Whether the caller is the user with id `user_id`
    pub async fn is_authenticated_user(&self, user_id: i64, principal: Option<&Principal>) -> bool {
        matches!(self.current_user(principal).await, Ok(user) if user.id == user_id)
    }

    async fn current_user(&self, principal: Option<&Principal>) -> Result<User, ServiceError> {
        let Some(principal) = principal else {
            tracing::warn!("{}", NO_AUTHORIZATION);
            return Err(ServiceError::AccessDenied(NO_AUTHORIZATION.to_string()));
        };
        Ok(self.identity.resolve_user(&principal.name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::StaticIdentityService;

    fn validator() -> AccessValidator {
        let directory = StaticIdentityService::new()
            .with_user("ada", 1, Role::Admin)
            .with_user("ivan", 2, Role::Instructor)
            .with_user("sam", 3, Role::Student);
        AccessValidator::new(Arc::new(directory))
    }

    fn caller(name: &str) -> Principal {
        Principal::new(name)
    }

    #[test]
    fn every_operation_has_a_rule() {
        for operation in Operation::ALL {
            assert!(access_for(operation).is_some(), "{:?} has no rule", operation);
        }
    }

    #[tokio::test]
    async fn student_is_denied_on_instructor_operations() {
        let validator = validator();
        let sam = caller("sam");
        assert!(matches!(
            validator.authorize(Operation::LessonCreate, Some(&sam)).await,
            Err(ServiceError::AccessDenied(_))
        ));
        assert_eq!(validator.authorize(Operation::LessonRead, Some(&sam)).await.unwrap(), 3);
        assert_eq!(validator.authorize(Operation::LessonListByGroup, Some(&sam)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn instructor_is_allowed_and_gets_own_id() {
        let id = validator()
            .authorize(Operation::ActivityDelete, Some(&caller("ivan")))
            .await
            .unwrap();
        assert_eq!(id, 2);
    }

    #[tokio::test]
    async fn missing_principal_is_denied() {
        let err = validator().authorize(Operation::LessonRead, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied(msg) if msg == "No authorization provided"));
    }

    #[tokio::test]
    async fn unknown_caller_is_not_found() {
        let err = validator()
            .authorize(Operation::LessonRead, Some(&caller("mallory")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn specific_user_may_access_own_record() {
        let validator = validator();
        let sam = caller("sam");
        assert_eq!(validator.access_admin_instructor_or_user(3, Some(&sam)).await.unwrap(), 3);
        assert!(validator.access_admin_instructor_or_user(1, Some(&sam)).await.is_err());
        assert_eq!(
            validator.access_admin_instructor_or_user(3, Some(&caller("ivan"))).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn boolean_helpers_swallow_errors() {
        let validator = validator();
        assert!(validator.is_admin(Some(&caller("ada"))).await);
        assert!(!validator.is_admin(Some(&caller("ivan"))).await);
        assert!(validator.is_admin_or_instructor(Some(&caller("ivan"))).await);
        assert!(!validator.is_admin_or_instructor(None).await);
        assert!(validator.is_authenticated_user(3, Some(&caller("sam"))).await);
        assert!(!validator.is_authenticated_user(3, Some(&caller("mallory"))).await);
    }

    #[test]
    fn null_payload_is_invalid() {
        let err = require_payload::<u8>(None, "lesson").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(msg) if msg == "No lesson information was provided"));
        assert_eq!(require_payload(Some(5), "lesson").unwrap(), 5);
    }

    fn lesson(text: &str) -> LessonPayload {
        LessonPayload {
            id: None,
            course: "PVT".to_string(),
            chapter: 1,
            title: None,
            text: Some(text.to_string()),
            required: false,
        }
    }

    #[test]
    fn lesson_text_over_limit_is_invalid() {
        assert!(lesson(&"x".repeat(4000)).validate().is_ok());
        let err = lesson(&"x".repeat(4001)).validate().unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(msg) if msg == "Lesson text must be at most 4000 characters"));
    }

    #[test]
    fn limits_count_characters_not_bytes() {
        // 4000 two-byte characters
        assert!(lesson(&"é".repeat(4000)).validate().is_ok());
    }

    #[test]
    fn every_plan_text_field_is_limited() {
        let mut plan = LessonPlanPayload {
            id: None,
            title: "Stalls".to_string(),
            summary: "s".repeat(2000),
            objective: None,
            content: None,
            schedule: None,
            equipment: None,
            instructor_actions: None,
            student_actions: None,
            completion_standards: None,
            presentable: false,
            lesson_ids: None,
            activity_ids: None,
        };
        assert!(plan.validate().is_ok());

        plan.completion_standards = Some("c".repeat(2001));
        let err = plan.validate().unwrap_err();
        assert!(matches!(err, ServiceError::InvalidPayload(msg) if msg.contains("completionStandards")));
    }

    #[test]
    fn activity_type_is_limited() {
        let activity = ActivityPayload {
            id: None,
            title: "Preflight".to_string(),
            activity_type: "g".repeat(256),
            duration: None,
            reference_id: None,
        };
        assert!(activity.validate().is_err());
    }
}
