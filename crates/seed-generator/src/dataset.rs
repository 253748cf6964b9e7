//! Full relational dataset generation in dependency order.

use crate::batch::BatchMetrics;
use crate::config::SeedPlan;
use crate::error::GeneratorError;
use crate::generator::EntityGenerator;
use rand::Rng;
use seed_core::RelationalStores;
use std::time::{Duration, Instant};
use tracing::info;

/// Per-entity metrics of one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetReport {
    pub students: BatchMetrics,
    pub instructors: BatchMetrics,
    pub courses: BatchMetrics,
    pub enrollments: BatchMetrics,
    pub total_duration: Duration,
}

impl DatasetReport {
    pub fn total_records(&self) -> u64 {
        self.students.rows_written
            + self.instructors.rows_written
            + self.courses.rows_written
            + self.enrollments.rows_written
    }
}

/// Generate the whole relational dataset described by `plan`.
///
/// Students and instructors go first. Courses are generated against the
/// instructors read back from the store, and enrollments against the
/// students and courses read back from the store, so every reference points
/// at a persisted key.
pub async fn generate_dataset<R: Rng + Send>(
    generator: &mut EntityGenerator<R>,
    plan: &SeedPlan,
    stores: &RelationalStores,
) -> Result<DatasetReport, GeneratorError> {
    let start = Instant::now();
    info!(
        "Starting database seeding: Students: {}, Instructors: {}, Courses: {}, Enrollments: {}",
        plan.students, plan.instructors, plan.courses, plan.enrollments
    );

    let students = generator
        .generate_students(stores.students.as_ref(), plan.students)
        .await?;
    let instructors = generator
        .generate_instructors(stores.instructors.as_ref(), plan.instructors)
        .await?;

    let persisted_instructors = stores.instructors.find_all().await?;
    let courses = generator
        .generate_courses(stores.courses.as_ref(), plan.courses, &persisted_instructors)
        .await?;
    drop(persisted_instructors);

    let persisted_students = stores.students.find_all().await?;
    let persisted_courses = stores.courses.find_all().await?;
    let enrollments = generator
        .generate_enrollments(
            stores.enrollments.as_ref(),
            plan.enrollments,
            &persisted_students,
            &persisted_courses,
        )
        .await?;

    let report = DatasetReport {
        students,
        instructors,
        courses,
        enrollments,
        total_duration: start.elapsed(),
    };

    info!(
        "Data generation completed in {:?}. Total records: {} (Students: {}, Instructors: {}, Courses: {}, Enrollments: {})",
        report.total_duration,
        report.total_records(),
        report.students.rows_written,
        report.instructors.rows_written,
        report.courses.rows_written,
        report.enrollments.rows_written
    );

    Ok(report)
}
