//! Pure relational-to-document conversions.
//!
//! Every function here copies fields; none of them touch a store. Keys that
//! cross the boundary are passed in already translated.

use chrono::NaiveDate;
use seed_core::{
    Course, CourseDocument, DocumentId, Enrollment, EnrollmentInfo, Instructor,
    InstructorDocument, InstructorInfo, RelationalId, Student, StudentDocument, StudentInfo,
};

pub fn instructor_document(instructor: &Instructor) -> InstructorDocument {
    InstructorDocument {
        first_name: instructor.first_name.clone(),
        last_name: instructor.last_name.clone(),
        email: instructor.email.clone(),
        department: instructor.department.clone(),
        phone_number: instructor.phone_number.clone(),
        office_location: instructor.office_location.clone(),
        hire_date: instructor.hire_date,
        biography: instructor.biography.clone(),
    }
}

pub fn instructor_info(id: DocumentId, instructor: &Instructor) -> InstructorInfo {
    InstructorInfo {
        id,
        first_name: instructor.first_name.clone(),
        last_name: instructor.last_name.clone(),
        email: instructor.email.clone(),
        department: instructor.department.clone(),
    }
}

/// Course document without enrolled students; the backfill stage fills them.
pub fn course_document(course: &Course, instructor: InstructorInfo) -> CourseDocument {
    CourseDocument {
        name: course.name.clone(),
        description: course.description.clone(),
        instructor,
        enrolled_students: Vec::new(),
    }
}

pub fn enrollment_info(
    enrollment_id: RelationalId,
    enrollment: &Enrollment,
    course_document_id: DocumentId,
    course: &Course,
    enrollment_date: NaiveDate,
) -> EnrollmentInfo {
    EnrollmentInfo {
        enrollment_id: enrollment_id.to_string(),
        course_id: course_document_id,
        course_name: course.name.clone(),
        course_description: course.description.clone(),
        grade: enrollment.grade,
        enrollment_date,
    }
}

pub fn student_document(student: &Student, enrollments: Vec<EnrollmentInfo>) -> StudentDocument {
    StudentDocument {
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        email: student.email.clone(),
        date_of_birth: student.date_of_birth,
        phone_number: student.phone_number.clone(),
        address: student.address.clone(),
        registration_date: student.registration_date,
        enrollments,
    }
}

/// Snapshot of a materialized student for a course's enrolled list.
pub fn student_info(id: DocumentId, student: &StudentDocument, grade: Option<f64>) -> StudentInfo {
    StudentInfo {
        student_id: id,
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        email: student.email.clone(),
        grade,
    }
}
