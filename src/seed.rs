//! Run orchestration: guard, generate, materialize.

use crate::benchmark::{BenchmarkReport, PerformanceResult};
use crate::config::{ConfigFile, MaterializeConfig};
use anyhow::Context;
use chrono::NaiveDate;
use seed_core::{DocumentStores, RelationalStores};
use seed_generator::{
    generate_dataset, DatasetReport, EntityGenerator, GuardDecision, SeedConfig, SeedGuard,
    SkipReason,
};
use seed_materializer::{DocumentMaterializer, MaterializeOutcome, MaterializeReport, Stage};
use serde::Serialize;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum GenerateOutcome {
    Generated(DatasetReport),
    Skipped(SkipReason),
}

/// Check the guard and, if it allows, generate the relational dataset.
///
/// A skipped run writes nothing.
pub async fn generate(
    config: &SeedConfig,
    relational: &RelationalStores,
    today: NaiveDate,
) -> anyhow::Result<GenerateOutcome> {
    let decision = SeedGuard::new(config)
        .check(relational.students.as_ref())
        .await
        .context("Seed configuration rejected")?;

    let plan = match decision {
        GuardDecision::Proceed(plan) => plan,
        GuardDecision::Skip(reason) => {
            info!("Skipping seed run: {}", reason);
            return Ok(GenerateOutcome::Skipped(reason));
        }
    };

    if let Some(seed) = plan.random_seed {
        info!("Using fixed random seed {}", seed);
    }
    let mut generator = EntityGenerator::for_plan(&plan, today);
    let report = generate_dataset(&mut generator, &plan, relational)
        .await
        .context("Failed to generate relational dataset")?;
    Ok(GenerateOutcome::Generated(report))
}

/// Materialize the relational dataset into the document stores.
pub async fn materialize(
    config: &MaterializeConfig,
    relational: &RelationalStores,
    documents: &DocumentStores,
    today: NaiveDate,
) -> anyhow::Result<MaterializeOutcome> {
    let materializer =
        DocumentMaterializer::new(relational.clone(), documents.clone(), config.options(today));
    materializer
        .run()
        .await
        .context("Failed to materialize documents")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeneratedCounts {
    pub students: u64,
    pub instructors: u64,
    pub courses: u64,
    pub enrollments: u64,
}

impl From<&DatasetReport> for GeneratedCounts {
    fn from(report: &DatasetReport) -> Self {
        Self {
            students: report.students.rows_written,
            instructors: report.instructors.rows_written,
            courses: report.courses.rows_written,
            enrollments: report.enrollments.rows_written,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaterializedCounts {
    pub instructors: u64,
    pub courses: u64,
    pub students: u64,
    pub courses_backfilled: u64,
    pub skipped_references: u64,
}

impl From<&MaterializeReport> for MaterializedCounts {
    fn from(report: &MaterializeReport) -> Self {
        Self {
            instructors: report.written(Stage::Instructors),
            courses: report.written(Stage::Courses),
            students: report.written(Stage::Students),
            courses_backfilled: report.written(Stage::CourseBackfill),
            skipped_references: report.soft_misses(),
        }
    }
}

/// Machine-readable outcome of a CLI run, printed as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materialized: Option<MaterializedCounts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<Vec<PerformanceResult>>,
    pub duration_ms: u64,
}

impl RunSummary {
    fn skipped(reason: impl ToString, start: Instant) -> Self {
        Self {
            status: RunStatus::Skipped,
            skip_reason: Some(reason.to_string()),
            generated: None,
            materialized: None,
            benchmark: None,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn for_generate(outcome: &GenerateOutcome, start: Instant) -> Self {
        match outcome {
            GenerateOutcome::Skipped(reason) => Self::skipped(reason, start),
            GenerateOutcome::Generated(report) => Self {
                status: RunStatus::Completed,
                skip_reason: None,
                generated: Some(report.into()),
                materialized: None,
                benchmark: None,
                duration_ms: start.elapsed().as_millis() as u64,
            },
        }
    }

    pub fn for_materialize(outcome: &MaterializeOutcome, start: Instant) -> Self {
        match outcome {
            MaterializeOutcome::SkippedEmptySource => {
                Self::skipped("relational store contains no students", start)
            }
            MaterializeOutcome::Completed(report) => Self {
                status: RunStatus::Completed,
                skip_reason: None,
                generated: None,
                materialized: Some(report.into()),
                benchmark: None,
                duration_ms: start.elapsed().as_millis() as u64,
            },
        }
    }

    pub fn for_benchmark(report: &BenchmarkReport, start: Instant) -> Self {
        Self {
            status: RunStatus::Completed,
            skip_reason: None,
            generated: None,
            materialized: None,
            benchmark: Some(report.results.clone()),
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize run summary")
    }
}

/// Full pipeline: guard, generate, then materialize.
///
/// Materialization only runs when generation ran.
pub async fn run_seed(
    config: &ConfigFile,
    relational: &RelationalStores,
    documents: &DocumentStores,
    today: NaiveDate,
) -> anyhow::Result<RunSummary> {
    let start = Instant::now();

    let generated = match generate(&config.seed, relational, today).await? {
        GenerateOutcome::Generated(report) => report,
        skipped @ GenerateOutcome::Skipped(_) => {
            return Ok(RunSummary::for_generate(&skipped, start));
        }
    };

    let outcome = materialize(&config.materialize, relational, documents, today).await?;
    let mut summary = RunSummary::for_materialize(&outcome, start);
    summary.generated = Some(GeneratedCounts::from(&generated));
    Ok(summary)
}
