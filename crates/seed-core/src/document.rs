//! Denormalized, read-optimized documents.
//!
//! Embedded snapshots (`InstructorInfo`, `StudentInfo`, `EnrollmentInfo`) are
//! copies taken at materialization time, not live references. Field names
//! serialize in camelCase to match the document collections.

use crate::id::DocumentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorDocument {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub phone_number: Option<String>,
    pub office_location: Option<String>,
    pub hire_date: NaiveDate,
    pub biography: Option<String>,
}

/// Instructor summary embedded in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorInfo {
    pub id: DocumentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
}

/// Enrolled-student summary embedded in a course by the backfill stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    pub student_id: DocumentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub grade: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDocument {
    pub name: String,
    pub description: String,
    pub instructor: InstructorInfo,
    #[serde(default)]
    pub enrolled_students: Vec<StudentInfo>,
}

/// Enrollment summary embedded in a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentInfo {
    /// Relational enrollment key, rendered as a string.
    pub enrollment_id: String,
    pub course_id: DocumentId,
    pub course_name: String,
    pub course_description: String,
    pub grade: Option<f64>,
    pub enrollment_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDocument {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub registration_date: NaiveDate,
    #[serde(default)]
    pub enrollments: Vec<EnrollmentInfo>,
}

/// Documents that accept a partial update after their initial write.
///
/// A patch only touches the fields it sets; everything else in the stored
/// document is left as is.
pub trait Patchable: Send + Sync + 'static {
    type Patch: Serialize + Clone + Send + Sync + 'static;

    fn apply_patch(&mut self, patch: Self::Patch);
}

/// Merge patch for a course document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrolled_students: Option<Vec<StudentInfo>>,
}

impl CoursePatch {
    pub fn enrolled_students(students: Vec<StudentInfo>) -> Self {
        Self {
            enrolled_students: Some(students),
        }
    }
}

impl Patchable for CourseDocument {
    type Patch = CoursePatch;

    fn apply_patch(&mut self, patch: CoursePatch) {
        if let Some(students) = patch.enrolled_students {
            self.enrolled_students = students;
        }
    }
}
