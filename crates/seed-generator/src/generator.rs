//! Entity generator for producing synthetic relational data.

use crate::batch::{BatchMetrics, BatchWriter, DEFAULT_BATCH_SIZE};
use crate::config::{GradeScale, SeedPlan};
use crate::error::GeneratorError;
use crate::pools::*;
use chrono::{Days, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use seed_core::{
    Course, Enrollment, EntityKind, Instructor, Record, RelationalId, Store, Student,
};
use tracing::info;

/// Generator that produces constrained random entities.
///
/// All randomness comes from the injected `rng`, and all dates are computed
/// relative to `today`, so a fixed seed and a fixed date reproduce the same
/// dataset. Emails embed the loop index and are therefore unique per type.
pub struct EntityGenerator<R> {
    rng: R,
    today: NaiveDate,
    grade_scale: GradeScale,
    batch_size: usize,
}

impl EntityGenerator<StdRng> {
    /// Create a generator with a deterministic RNG.
    pub fn seeded(seed: u64, today: NaiveDate) -> Self {
        Self::new(StdRng::seed_from_u64(seed), today)
    }

    /// Create a generator configured from a validated plan.
    ///
    /// Uses the plan's fixed seed when present, OS entropy otherwise.
    pub fn for_plan(plan: &SeedPlan, today: NaiveDate) -> Self {
        let rng = match plan.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(rng, today)
            .with_grade_scale(plan.grade_scale)
            .with_batch_size(plan.batch_size)
    }
}

impl<R: Rng + Send> EntityGenerator<R> {
    pub fn new(rng: R, today: NaiveDate) -> Self {
        Self {
            rng,
            today,
            grade_scale: GradeScale::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_grade_scale(mut self, grade_scale: GradeScale) -> Self {
        self.grade_scale = grade_scale;
        self
    }

    /// Set the chunk size used for writes.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    fn pick(&mut self, pool: &'static [&'static str]) -> &'static str {
        pool[self.rng.gen_range(0..pool.len())]
    }

    fn years_ago(&self, years: u32) -> NaiveDate {
        self.today
            .checked_sub_months(Months::new(years * 12))
            .unwrap_or(self.today)
    }

    fn days_ago(&self, days: u64) -> NaiveDate {
        self.today
            .checked_sub_days(Days::new(days))
            .unwrap_or(self.today)
    }

    fn grade(&mut self) -> f64 {
        match self.grade_scale {
            GradeScale::Legacy => 1.0 + self.rng.gen::<f64>() * 4.0,
            GradeScale::Percent => self.rng.gen_range(GradeScale::Percent.range()),
        }
    }

    /// Build the student at position `index`.
    pub fn student(&mut self, index: u64) -> Student {
        let first_name = self.pick(STUDENT_FIRST_NAMES);
        let last_name = self.pick(STUDENT_LAST_NAMES);
        let age = 18 + self.rng.gen_range(0..25);
        let phone = 600_000_000u64 + self.rng.gen_range(0..99_999_999u64);
        let city = self.pick(CITIES);
        let registered_days_ago = self.rng.gen_range(0..1095);

        Student {
            first_name: format!("{first_name}{index}"),
            last_name: last_name.to_string(),
            email: format!("student{index}@{EMAIL_DOMAIN}"),
            date_of_birth: self.years_ago(age),
            phone_number: Some(format!("+43{phone}")),
            address: Some(format!("{city} Street {}", index % 1000)),
            registration_date: self.days_ago(registered_days_ago),
        }
    }

    /// Build the instructor at position `index`.
    pub fn instructor(&mut self, index: u64) -> Instructor {
        let first_name = self.pick(INSTRUCTOR_FIRST_NAMES);
        let last_name = self.pick(INSTRUCTOR_LAST_NAMES);
        let department = self.pick(DEPARTMENTS);
        let phone = 660_000_000u64 + self.rng.gen_range(0..99_999_999u64);
        let building = self.pick(BUILDINGS);
        let years_employed = self.rng.gen_range(0..20);
        let years_in_academia = 1 + self.rng.gen_range(0..25);
        let specialty = DEPARTMENTS[(index % DEPARTMENTS.len() as u64) as usize];

        Instructor {
            first_name: first_name.to_string(),
            last_name: format!("{last_name}{index}"),
            email: format!("instructor{index}@{EMAIL_DOMAIN}"),
            department: department.to_string(),
            phone_number: Some(format!("+43{phone}")),
            office_location: Some(format!("{building} Room {}", 100 + index % 900)),
            hire_date: self.years_ago(years_employed),
            biography: Some(format!(
                "Experienced professor with {years_in_academia} years in academia. \
                 Specializes in various aspects of {specialty}."
            )),
        }
    }

    /// Build the course at position `index`, taught by `instructor_id`.
    pub fn course(&mut self, index: u64, instructor_id: RelationalId) -> Course {
        let prefix = self.pick(COURSE_PREFIXES);
        let topic = self.pick(COURSE_TOPICS);

        Course {
            name: format!("{prefix} {topic} {}", index + 1),
            description: format!(
                "This is a comprehensive course covering various aspects of the subject. \
                 Students will learn through lectures, assignments, and projects. \
                 Course code: CS-{}",
                1000 + index
            ),
            instructor_id,
        }
    }

    /// Build an enrollment; half of them carry a grade.
    pub fn enrollment(&mut self, student_id: RelationalId, course_id: RelationalId) -> Enrollment {
        let grade = if self.rng.gen_bool(0.5) {
            Some(self.grade())
        } else {
            None
        };

        Enrollment {
            student_id,
            course_id,
            grade,
        }
    }

    fn pick_id<T>(&mut self, parents: &[Record<RelationalId, T>]) -> RelationalId {
        parents[self.rng.gen_range(0..parents.len())].id
    }

    pub async fn generate_students(
        &mut self,
        store: &dyn Store<RelationalId, Student>,
        count: u64,
    ) -> Result<BatchMetrics, GeneratorError> {
        info!("Generating {} students...", count);
        let mut writer = BatchWriter::new(store, self.batch_size)?;
        for index in 0..count {
            let student = self.student(index);
            writer.push(student).await?;
        }
        let metrics = writer.finish().await?;
        info!("Completed generating {} students", metrics.rows_written);
        Ok(metrics)
    }

    pub async fn generate_instructors(
        &mut self,
        store: &dyn Store<RelationalId, Instructor>,
        count: u64,
    ) -> Result<BatchMetrics, GeneratorError> {
        info!("Generating {} instructors...", count);
        let mut writer = BatchWriter::new(store, self.batch_size)?;
        for index in 0..count {
            let instructor = self.instructor(index);
            writer.push(instructor).await?;
        }
        let metrics = writer.finish().await?;
        info!("Completed generating {} instructors", metrics.rows_written);
        Ok(metrics)
    }

    /// Generate courses, each taught by an instructor drawn uniformly from
    /// `instructors` (which must already be persisted).
    pub async fn generate_courses(
        &mut self,
        store: &dyn Store<RelationalId, Course>,
        count: u64,
        instructors: &[Record<RelationalId, Instructor>],
    ) -> Result<BatchMetrics, GeneratorError> {
        if count > 0 && instructors.is_empty() {
            return Err(GeneratorError::MissingParents {
                kind: EntityKind::Course,
                parent: EntityKind::Instructor,
            });
        }

        info!(
            "Generating {} courses across {} instructors...",
            count,
            instructors.len()
        );
        let mut writer = BatchWriter::new(store, self.batch_size)?;
        for index in 0..count {
            let instructor_id = self.pick_id(instructors);
            let course = self.course(index, instructor_id);
            writer.push(course).await?;
        }
        let metrics = writer.finish().await?;
        info!("Completed generating {} courses", metrics.rows_written);
        Ok(metrics)
    }

    /// Generate enrollments linking a uniformly drawn student to a uniformly
    /// drawn course. Both sets must already be persisted.
    pub async fn generate_enrollments(
        &mut self,
        store: &dyn Store<RelationalId, Enrollment>,
        count: u64,
        students: &[Record<RelationalId, Student>],
        courses: &[Record<RelationalId, Course>],
    ) -> Result<BatchMetrics, GeneratorError> {
        if count > 0 {
            if students.is_empty() {
                return Err(GeneratorError::MissingParents {
                    kind: EntityKind::Enrollment,
                    parent: EntityKind::Student,
                });
            }
            if courses.is_empty() {
                return Err(GeneratorError::MissingParents {
                    kind: EntityKind::Enrollment,
                    parent: EntityKind::Course,
                });
            }
        }

        info!("Generating {} enrollments...", count);
        let mut writer = BatchWriter::new(store, self.batch_size)?;
        for _ in 0..count {
            let student_id = self.pick_id(students);
            let course_id = self.pick_id(courses);
            let enrollment = self.enrollment(student_id, course_id);
            writer.push(enrollment).await?;
        }
        let metrics = writer.finish().await?;
        info!("Completed generating {} enrollments", metrics.rows_written);
        Ok(metrics)
    }
}
