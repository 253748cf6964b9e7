//! Relational entities (the source of truth).
//!
//! Entities here never carry their own key: the store assigns one on save and
//! hands it back inside a [`Record`](crate::Record). References to other
//! entities are plain relational keys.

use crate::id::RelationalId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four entity types the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Instructor,
    Course,
    Enrollment,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Instructor => "instructors",
            EntityKind::Course => "courses",
            EntityKind::Enrollment => "enrollments",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub first_name: String,
    pub last_name: String,
    /// Unique across all students.
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub registration_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructor {
    pub first_name: String,
    pub last_name: String,
    /// Unique across all instructors.
    pub email: String,
    pub department: String,
    pub phone_number: Option<String>,
    pub office_location: Option<String>,
    pub hire_date: NaiveDate,
    pub biography: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub name: String,
    pub description: String,
    pub instructor_id: RelationalId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub student_id: RelationalId,
    pub course_id: RelationalId,
    /// `None` models an enrollment that is still in progress.
    pub grade: Option<f64>,
}

impl Enrollment {
    pub const MIN_GRADE: f64 = 0.0;
    pub const MAX_GRADE: f64 = 100.0;

    /// Whether the grade, if any, lies in the validated range.
    pub fn has_valid_grade(&self) -> bool {
        self.grade
            .map_or(true, |g| (Self::MIN_GRADE..=Self::MAX_GRADE).contains(&g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_validation() {
        let mut enrollment = Enrollment {
            student_id: 1,
            course_id: 1,
            grade: None,
        };
        assert!(enrollment.has_valid_grade());

        enrollment.grade = Some(100.0);
        assert!(enrollment.has_valid_grade());

        enrollment.grade = Some(100.5);
        assert!(!enrollment.has_valid_grade());

        enrollment.grade = Some(-1.0);
        assert!(!enrollment.has_valid_grade());
    }

    #[test]
    fn test_entity_kind_names() {
        assert_eq!(EntityKind::Student.to_string(), "students");
        assert_eq!(EntityKind::Enrollment.as_str(), "enrollments");
    }
}
