/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Role of a caller as reported by the identity service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Instructor,
    Student,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Admin => "admin",
            Role::Instructor => "instructor",
            Role::Student => "student",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// Case-insensitive, e.g. `Instructor` and `instructor` both parse
impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Role::Admin, Role::Instructor, Role::Student]
            .into_iter()
            .find(|role| role.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Every guarded endpoint of the service.
/// The permission table in `validation` maps each one to an access rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    LessonCreate,
    LessonRead,
    LessonUpdate,
    LessonDelete,
    LessonList,
    LessonListByGroup,
    LessonPlanCreate,
    LessonPlanRead,
    LessonPlanUpdate,
    LessonPlanDelete,
    LessonPlanList,
    ActivityCreate,
    ActivityRead,
    ActivityUpdate,
    ActivityDelete,
    ActivityList,
}

impl Operation {
    pub const ALL: [Operation; 16] = [
        Operation::LessonCreate,
        Operation::LessonRead,
        Operation::LessonUpdate,
        Operation::LessonDelete,
        Operation::LessonList,
        Operation::LessonListByGroup,
        Operation::LessonPlanCreate,
        Operation::LessonPlanRead,
        Operation::LessonPlanUpdate,
        Operation::LessonPlanDelete,
        Operation::LessonPlanList,
        Operation::ActivityCreate,
        Operation::ActivityRead,
        Operation::ActivityUpdate,
        Operation::ActivityDelete,
        Operation::ActivityList,
    ];
}
