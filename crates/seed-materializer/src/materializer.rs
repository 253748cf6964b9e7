//! Staged relational-to-document materialization.

use crate::builders;
use crate::error::MaterializeError;
use crate::report::{MaterializeReport, StageReport};
use crate::stage::Stage;
use crate::translation::IdTranslationTable;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt, TryStreamExt};
use seed_core::{
    Course, CoursePatch, DocumentId, DocumentStores, Enrollment, EntityKind, Instructor, Record,
    RelationalId, RelationalStores, Store, StoreError, StudentDocument,
};
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default number of chunk writes in flight per stage.
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Default number of documents per chunk write.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;

#[derive(Debug, Clone)]
pub struct MaterializeOptions {
    /// Date stamped on every embedded enrollment.
    pub enrollment_date: NaiveDate,
    pub concurrency: usize,
    pub chunk_size: usize,
    /// Empty the document stores before the first stage.
    pub clear_documents: bool,
}

impl MaterializeOptions {
    pub fn new(enrollment_date: NaiveDate) -> Self {
        Self {
            enrollment_date,
            concurrency: DEFAULT_CONCURRENCY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            clear_documents: true,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_clear_documents(mut self, clear: bool) -> Self {
        self.clear_documents = clear;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterializeOutcome {
    Completed(MaterializeReport),
    /// The relational student store was empty, so no stage ran.
    SkippedEmptySource,
}

/// Builds the document side from the relational side.
pub struct DocumentMaterializer {
    relational: RelationalStores,
    documents: DocumentStores,
    options: MaterializeOptions,
}

impl DocumentMaterializer {
    pub fn new(
        relational: RelationalStores,
        documents: DocumentStores,
        options: MaterializeOptions,
    ) -> Self {
        Self {
            relational,
            documents,
            options,
        }
    }

    pub fn options(&self) -> &MaterializeOptions {
        &self.options
    }

    /// Clear the document stores if configured, then run every stage.
    ///
    /// Nothing is materialized when the relational side holds no students.
    pub async fn run(&self) -> Result<MaterializeOutcome, MaterializeError> {
        if self.options.clear_documents {
            info!("Clearing existing document data...");
            self.documents
                .clear()
                .await
                .map_err(MaterializeError::Prepare)?;
        }

        let students = self
            .relational
            .students
            .count()
            .await
            .map_err(MaterializeError::Prepare)?;
        if students == 0 {
            info!("No students found in the relational store. Skipping materialization.");
            return Ok(MaterializeOutcome::SkippedEmptySource);
        }

        info!("Starting relational to document materialization...");
        let report = self.begin().run_to_end().await?;
        info!(
            "Materialization completed in {:?}: {} instructors, {} courses, {} students, {} courses backfilled, {} skipped references",
            report.total_duration,
            report.written(Stage::Instructors),
            report.written(Stage::Courses),
            report.written(Stage::Students),
            report.written(Stage::CourseBackfill),
            report.soft_misses()
        );
        Ok(MaterializeOutcome::Completed(report))
    }

    /// Start a run positioned before the first stage.
    ///
    /// Does not clear the document stores.
    pub fn begin(&self) -> MaterializeRun<'_> {
        MaterializeRun {
            materializer: self,
            next: Some(Stage::first()),
            failed: None,
            instructor_ids: IdTranslationTable::new(EntityKind::Instructor),
            course_ids: IdTranslationTable::new(EntityKind::Course),
            reports: Vec::with_capacity(Stage::ORDER.len()),
            started: Instant::now(),
        }
    }

    /// Write `(relational key, document)` pairs in chunks with up to
    /// `concurrency` chunks in flight and return the key each document got.
    async fn save_in_chunks<S, T>(
        &self,
        stage: Stage,
        store: &S,
        items: Vec<(RelationalId, T)>,
    ) -> Result<Vec<(RelationalId, DocumentId)>, MaterializeError>
    where
        S: Store<DocumentId, T> + ?Sized,
        T: Send + Sync + 'static,
    {
        let chunk_size = self.options.chunk_size.max(1);
        let mut chunks = Vec::with_capacity(items.len().div_ceil(chunk_size));
        let mut items = items.into_iter().peekable();
        while items.peek().is_some() {
            chunks.push(items.by_ref().take(chunk_size).collect::<Vec<_>>());
        }

        let mut writes = stream::iter(chunks)
            .map(|chunk| async move {
                let (keys, documents): (Vec<RelationalId>, Vec<T>) = chunk.into_iter().unzip();
                let saved = store
                    .save_all(documents)
                    .await
                    .map_err(MaterializeError::store(stage))?;
                if saved.len() != keys.len() {
                    return Err(MaterializeError::ShortWrite {
                        stage,
                        expected: keys.len(),
                        returned: saved.len(),
                    });
                }
                debug!("{}: chunk of {} documents written", stage, keys.len());
                Ok(keys
                    .into_iter()
                    .zip(saved.into_iter().map(|record| record.id))
                    .collect::<Vec<_>>())
            })
            .buffer_unordered(self.options.concurrency.max(1));

        let mut written = Vec::new();
        while let Some(chunk) = writes.try_next().await? {
            written.extend(chunk);
        }
        Ok(written)
    }
}

/// A materialization in progress, advanced one stage at a time.
///
/// Translation tables live on the run, so each stage sees exactly the
/// mappings its predecessors recorded. A failed stage halts the run for good.
pub struct MaterializeRun<'a> {
    materializer: &'a DocumentMaterializer,
    next: Option<Stage>,
    failed: Option<Stage>,
    instructor_ids: IdTranslationTable,
    course_ids: IdTranslationTable,
    reports: Vec<StageReport>,
    started: Instant,
}

impl MaterializeRun<'_> {
    /// The stage the next [`advance`](Self::advance) runs, if any.
    pub fn next_stage(&self) -> Option<Stage> {
        match self.failed {
            Some(_) => None,
            None => self.next,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.failed.is_none() && self.next.is_none()
    }

    pub fn reports(&self) -> &[StageReport] {
        &self.reports
    }

    pub fn instructor_ids(&self) -> &IdTranslationTable {
        &self.instructor_ids
    }

    pub fn course_ids(&self) -> &IdTranslationTable {
        &self.course_ids
    }

    /// Run the next stage and return its report, or `None` once every stage
    /// has completed.
    pub async fn advance(&mut self) -> Result<Option<&StageReport>, MaterializeError> {
        if let Some(stage) = self.failed {
            return Err(MaterializeError::Halted(stage));
        }
        let Some(stage) = self.next else {
            return Ok(None);
        };

        info!("Starting {}", stage);
        let start = Instant::now();
        let result = match stage {
            Stage::Instructors => self.instructor_stage().await,
            Stage::Courses => self.course_stage().await,
            Stage::Students => self.student_stage().await,
            Stage::CourseBackfill => self.course_backfill_stage().await,
        };

        match result {
            Ok(mut report) => {
                report.duration = start.elapsed();
                info!(
                    "Completed {} in {:?}: read {}, wrote {}, skipped {}",
                    stage, report.duration, report.read, report.written, report.soft_misses
                );
                self.next = stage.next();
                self.reports.push(report);
                Ok(self.reports.last())
            }
            Err(e) => {
                self.failed = Some(stage);
                Err(e)
            }
        }
    }

    /// Run every remaining stage.
    pub async fn run_to_end(mut self) -> Result<MaterializeReport, MaterializeError> {
        while self.advance().await?.is_some() {}
        Ok(MaterializeReport {
            stages: self.reports,
            total_duration: self.started.elapsed(),
        })
    }

    async fn instructor_stage(&mut self) -> Result<StageReport, MaterializeError> {
        let stage = Stage::Instructors;
        let m = self.materializer;
        let mut report = StageReport::new(stage);

        let instructors = m
            .relational
            .instructors
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?;
        report.read = instructors.len() as u64;

        let documents = instructors
            .iter()
            .map(|record| (record.id, builders::instructor_document(&record.data)))
            .collect();
        let written = m
            .save_in_chunks(stage, m.documents.instructors.as_ref(), documents)
            .await?;

        for (relational_id, document_id) in written {
            self.instructor_ids.record(relational_id, document_id)?;
            report.written += 1;
        }
        Ok(report)
    }

    async fn course_stage(&mut self) -> Result<StageReport, MaterializeError> {
        let stage = Stage::Courses;
        let m = self.materializer;
        let mut report = StageReport::new(stage);

        let courses = m
            .relational
            .courses
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?;
        report.read = courses.len() as u64;

        let instructors: HashMap<RelationalId, Instructor> = m
            .relational
            .instructors
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?
            .into_iter()
            .map(|record| (record.id, record.data))
            .collect();

        // Resolve every course before writing any of them.
        let mut documents = Vec::with_capacity(courses.len());
        for course in &courses {
            let instructor_id = course.data.instructor_id;
            let unresolved = || MaterializeError::UnresolvedInstructor {
                course_id: course.id,
                instructor_id,
            };
            let document_id = self
                .instructor_ids
                .resolve(instructor_id)
                .ok_or_else(unresolved)?;
            let instructor = instructors.get(&instructor_id).ok_or_else(unresolved)?;

            let info = builders::instructor_info(document_id.clone(), instructor);
            documents.push((course.id, builders::course_document(&course.data, info)));
        }

        let written = m
            .save_in_chunks(stage, m.documents.courses.as_ref(), documents)
            .await?;

        for (relational_id, document_id) in written {
            self.course_ids.record(relational_id, document_id)?;
            report.written += 1;
        }
        Ok(report)
    }

    async fn student_stage(&mut self) -> Result<StageReport, MaterializeError> {
        let stage = Stage::Students;
        let m = self.materializer;
        let mut report = StageReport::new(stage);

        let students = m
            .relational
            .students
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?;
        report.read = students.len() as u64;

        let courses: HashMap<RelationalId, Course> = m
            .relational
            .courses
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?
            .into_iter()
            .map(|record| (record.id, record.data))
            .collect();

        let mut by_student = group_enrollments(
            m.relational
                .enrollments
                .find_all()
                .await
                .map_err(MaterializeError::store(stage))?,
            |enrollment| enrollment.student_id,
        );

        let enrollment_date = m.options.enrollment_date;
        let mut documents = Vec::with_capacity(students.len());
        for student in &students {
            let enrollments = by_student.remove(&student.id).unwrap_or_default();
            let mut infos = Vec::with_capacity(enrollments.len());
            for enrollment in enrollments {
                let course_id = enrollment.data.course_id;
                match self.course_ids.resolve(course_id).zip(courses.get(&course_id)) {
                    Some((course_document_id, course)) => infos.push(builders::enrollment_info(
                        enrollment.id,
                        &enrollment.data,
                        course_document_id.clone(),
                        course,
                        enrollment_date,
                    )),
                    None => {
                        warn!(
                            "Enrollment {} references course {} which has no course document, skipping",
                            enrollment.id, course_id
                        );
                        report.soft_misses += 1;
                    }
                }
            }
            documents.push((student.id, builders::student_document(&student.data, infos)));
        }

        let orphaned: usize = by_student.values().map(Vec::len).sum();
        if orphaned > 0 {
            warn!(
                "{} enrollments reference students that do not exist, skipping",
                orphaned
            );
            report.soft_misses += orphaned as u64;
        }

        let written = m
            .save_in_chunks(stage, m.documents.students.as_ref(), documents)
            .await?;
        report.written = written.len() as u64;
        Ok(report)
    }

    async fn course_backfill_stage(&mut self) -> Result<StageReport, MaterializeError> {
        let stage = Stage::CourseBackfill;
        let m = self.materializer;
        let mut report = StageReport::new(stage);

        let enrollments = m
            .relational
            .enrollments
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?;
        report.read = enrollments.len() as u64;

        let emails: HashMap<RelationalId, String> = m
            .relational
            .students
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?
            .into_iter()
            .map(|record| (record.id, record.data.email))
            .collect();

        // Students are located by email, the only field both sides share.
        let student_documents: HashMap<String, Record<DocumentId, StudentDocument>> = m
            .documents
            .students
            .find_all()
            .await
            .map_err(MaterializeError::store(stage))?
            .into_iter()
            .map(|record| (record.data.email.clone(), record))
            .collect();

        let mut patches = Vec::new();
        for (course_id, group) in group_enrollments(enrollments, |enrollment| enrollment.course_id)
        {
            let Some(course_document_id) = self.course_ids.resolve(course_id) else {
                warn!(
                    "Course {} has no course document, skipping backfill of {} enrollments",
                    course_id,
                    group.len()
                );
                report.soft_misses += 1;
                continue;
            };

            let mut enrolled = Vec::with_capacity(group.len());
            for enrollment in group {
                let student = emails
                    .get(&enrollment.data.student_id)
                    .and_then(|email| student_documents.get(email));
                match student {
                    Some(doc) => enrolled.push(builders::student_info(
                        doc.id.clone(),
                        &doc.data,
                        enrollment.data.grade,
                    )),
                    None => {
                        warn!(
                            "Enrollment {} references student {} which has no student document, skipping",
                            enrollment.id, enrollment.data.student_id
                        );
                        report.soft_misses += 1;
                    }
                }
            }
            patches.push((course_id, course_document_id.clone(), enrolled));
        }

        let courses = m.documents.courses.as_ref();
        let mut results = stream::iter(patches)
            .map(|(course_id, document_id, enrolled)| async move {
                // A course document removed since its stage reports false.
                let patched = courses
                    .patch(&document_id, CoursePatch::enrolled_students(enrolled))
                    .await?;
                Ok::<_, StoreError>((course_id, patched))
            })
            .buffer_unordered(m.options.concurrency.max(1));

        while let Some((course_id, patched)) = results
            .try_next()
            .await
            .map_err(MaterializeError::store(stage))?
        {
            if patched {
                report.written += 1;
            } else {
                warn!(
                    "Course document for course {} no longer exists, skipping backfill",
                    course_id
                );
                report.soft_misses += 1;
            }
        }
        Ok(report)
    }
}

/// Group enrollments by a relational key, keeping store order inside each
/// group.
fn group_enrollments<F>(
    enrollments: Vec<Record<RelationalId, Enrollment>>,
    key: F,
) -> BTreeMap<RelationalId, Vec<Record<RelationalId, Enrollment>>>
where
    F: Fn(&Enrollment) -> RelationalId,
{
    let mut groups: BTreeMap<RelationalId, Vec<Record<RelationalId, Enrollment>>> =
        BTreeMap::new();
    for enrollment in enrollments {
        groups
            .entry(key(&enrollment.data))
            .or_default()
            .push(enrollment);
    }
    groups
}
