//! The four materialization stages and their fixed order.

use serde::Serialize;
use std::fmt;

/// One materialization stage.
///
/// Stages run strictly in [`Stage::ORDER`]: each one reads the translation
/// tables filled by the stages before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Instructors,
    Courses,
    Students,
    CourseBackfill,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [
        Stage::Instructors,
        Stage::Courses,
        Stage::Students,
        Stage::CourseBackfill,
    ];

    pub fn first() -> Stage {
        Stage::Instructors
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Instructors => Some(Stage::Courses),
            Stage::Courses => Some(Stage::Students),
            Stage::Students => Some(Stage::CourseBackfill),
            Stage::CourseBackfill => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Instructors => "instructors",
            Stage::Courses => "courses",
            Stage::Students => "students",
            Stage::CourseBackfill => "course_backfill",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} stage", self.as_str())
    }
}
