pub mod activity;
pub mod lesson;
pub mod lesson_plan;
pub mod link;

pub use activity::{Activity, ActivityPayload};
pub use lesson::{Lesson, LessonPayload};
pub use lesson_plan::{LessonPlan, LessonPlanPayload, LessonPlanView};
pub use link::{Link, LinkKind};
