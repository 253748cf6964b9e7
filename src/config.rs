//! Configuration file loading and command-line overrides.
//!
//! A config file holds a `seed` table (see [`SeedConfig`]) and optional
//! `materialize` and `benchmark` tables. Values given on the command line or
//! through the environment win over the file.

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use seed_generator::{GradeScale, SeedConfig};
use seed_materializer::{MaterializeOptions, DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for the document materialization step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MaterializeConfig {
    /// Empty the document collections before materializing.
    pub clear_documents: bool,
    /// Chunk writes in flight per stage.
    pub concurrency: usize,
    pub chunk_size: usize,
    /// Date stamped on embedded enrollments; today when unset.
    pub enrollment_date: Option<NaiveDate>,
}

impl Default for MaterializeConfig {
    fn default() -> Self {
        Self {
            clear_documents: true,
            concurrency: DEFAULT_CONCURRENCY,
            chunk_size: DEFAULT_CHUNK_SIZE,
            enrollment_date: None,
        }
    }
}

impl MaterializeConfig {
    pub fn options(&self, today: NaiveDate) -> MaterializeOptions {
        MaterializeOptions::new(self.enrollment_date.unwrap_or(today))
            .with_concurrency(self.concurrency)
            .with_chunk_size(self.chunk_size)
            .with_clear_documents(self.clear_documents)
    }
}

/// Options for the store performance comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BenchmarkConfig {
    /// Batch sizes of the write test, one timed write each.
    pub write_sizes: Vec<usize>,
    /// Most records rewritten by the update test.
    pub update_limit: usize,
    /// Most benchmark records removed by the timed delete test.
    pub delete_limit: usize,
    /// Email looked up by the filter test.
    pub filter_email: String,
    /// Remove the remaining benchmark records after the run.
    pub cleanup: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            write_sizes: vec![100, 1000, 10_000],
            update_limit: 100,
            delete_limit: 100,
            filter_email: "student0@university.edu".to_string(),
            cleanup: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub seed: SeedConfig,
    pub materialize: MaterializeConfig,
    pub benchmark: BenchmarkConfig,
}

impl ConfigFile {
    /// Load from a `.toml`, `.yaml` or `.yml` file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {path:?}"))?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&content),
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            _ => anyhow::bail!(
                "Unsupported config file extension for {path:?} (expected .toml, .yaml or .yml)"
            ),
        }
        .with_context(|| format!("Failed to parse config file {path:?}"))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).context("Invalid TOML")
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Invalid YAML")
    }
}

/// `seed.*` overrides from flags or environment variables.
#[derive(Args, Clone, Debug, Default)]
pub struct SeedOverrides {
    /// Enable or disable seeding (seed.enabled)
    #[arg(long, env = "SEED_ENABLED")]
    pub enabled: Option<bool>,

    /// Number of students (seed.students.count)
    #[arg(long, env = "SEED_STUDENTS_COUNT", allow_negative_numbers = true)]
    pub students: Option<i64>,

    /// Number of instructors (seed.instructors.count)
    #[arg(long, env = "SEED_INSTRUCTORS_COUNT", allow_negative_numbers = true)]
    pub instructors: Option<i64>,

    /// Number of courses (seed.courses.count)
    #[arg(long, env = "SEED_COURSES_COUNT", allow_negative_numbers = true)]
    pub courses: Option<i64>,

    /// Number of enrollments (seed.enrollments.count)
    #[arg(long, env = "SEED_ENROLLMENTS_COUNT", allow_negative_numbers = true)]
    pub enrollments: Option<i64>,

    /// Records per batch write (seed.batch-size)
    #[arg(long, env = "SEED_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Fixed random seed for a reproducible dataset (seed.random-seed)
    #[arg(long, env = "SEED_RANDOM_SEED")]
    pub random_seed: Option<u64>,

    /// Grade scale: percent or legacy (seed.grade-scale)
    #[arg(long, env = "SEED_GRADE_SCALE")]
    pub grade_scale: Option<GradeScale>,

    /// Lowest accepted count (seed.bounds.min)
    #[arg(long, env = "SEED_BOUNDS_MIN", allow_negative_numbers = true)]
    pub bounds_min: Option<i64>,

    /// Highest accepted count (seed.bounds.max)
    #[arg(long, env = "SEED_BOUNDS_MAX", allow_negative_numbers = true)]
    pub bounds_max: Option<i64>,
}

impl SeedOverrides {
    pub fn apply(&self, config: &mut SeedConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(count) = self.students {
            config.students.count = count;
        }
        if let Some(count) = self.instructors {
            config.instructors.count = count;
        }
        if let Some(count) = self.courses {
            config.courses.count = count;
        }
        if let Some(count) = self.enrollments {
            config.enrollments.count = count;
        }
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if let Some(seed) = self.random_seed {
            config.random_seed = Some(seed);
        }
        if let Some(scale) = self.grade_scale {
            config.grade_scale = scale;
        }
        if let Some(min) = self.bounds_min {
            config.bounds.min = min;
        }
        if let Some(max) = self.bounds_max {
            config.bounds.max = max;
        }
    }
}

/// `materialize.*` overrides from flags or environment variables.
#[derive(Args, Clone, Debug, Default)]
pub struct MaterializeArgs {
    /// Clear document collections before materializing
    #[arg(long, env = "MATERIALIZE_CLEAR_DOCUMENTS")]
    pub clear_documents: Option<bool>,

    /// Chunk writes in flight per stage
    #[arg(long, env = "MATERIALIZE_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Documents per chunk write
    #[arg(long, env = "MATERIALIZE_CHUNK_SIZE")]
    pub chunk_size: Option<usize>,

    /// Enrollment date stamped into student documents (YYYY-MM-DD)
    #[arg(long, env = "MATERIALIZE_ENROLLMENT_DATE")]
    pub enrollment_date: Option<NaiveDate>,
}

impl MaterializeArgs {
    pub fn apply(&self, config: &mut MaterializeConfig) {
        if let Some(clear) = self.clear_documents {
            config.clear_documents = clear;
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(date) = self.enrollment_date {
            config.enrollment_date = Some(date);
        }
    }
}

/// `benchmark.*` overrides from flags or environment variables.
#[derive(Args, Clone, Debug, Default)]
pub struct BenchmarkArgs {
    /// Comma-separated write batch sizes (e.g. 100,1000,10000)
    #[arg(long, env = "BENCHMARK_WRITE_SIZES", value_delimiter = ',')]
    pub write_sizes: Option<Vec<usize>>,

    /// Most records rewritten by the update test
    #[arg(long, env = "BENCHMARK_UPDATE_LIMIT")]
    pub update_limit: Option<usize>,

    /// Most benchmark records removed by the delete test
    #[arg(long, env = "BENCHMARK_DELETE_LIMIT")]
    pub delete_limit: Option<usize>,

    /// Email looked up by the filter test
    #[arg(long, env = "BENCHMARK_FILTER_EMAIL")]
    pub filter_email: Option<String>,

    /// Keep the benchmark records instead of removing them afterwards
    #[arg(long)]
    pub keep_records: bool,
}

impl BenchmarkArgs {
    pub fn apply(&self, config: &mut BenchmarkConfig) {
        if let Some(sizes) = &self.write_sizes {
            config.write_sizes = sizes.clone();
        }
        if let Some(limit) = self.update_limit {
            config.update_limit = limit;
        }
        if let Some(limit) = self.delete_limit {
            config.delete_limit = limit;
        }
        if let Some(email) = &self.filter_email {
            config.filter_email = email.clone();
        }
        if self.keep_records {
            config.cleanup = false;
        }
    }
}

/// Load the config file if one is given, otherwise start from defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<ConfigFile> {
    match path {
        Some(path) => ConfigFile::from_file(path),
        None => Ok(ConfigFile::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_config(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_toml_file() {
        let file = write_config(
            ".toml",
            r#"
[seed]
enabled = true
batch-size = 500
random-seed = 42
grade-scale = "legacy"

[seed.students]
count = 250

[seed.enrollments]
count = 1200

[materialize]
concurrency = 4
enrollment-date = "2025-09-01"
"#,
        );

        let config = ConfigFile::from_file(file.path()).unwrap();
        assert_eq!(config.seed.students.count, 250);
        assert_eq!(config.seed.enrollments.count, 1200);
        assert_eq!(config.seed.instructors.count, 10);
        assert_eq!(config.seed.batch_size, 500);
        assert_eq!(config.seed.random_seed, Some(42));
        assert_eq!(config.seed.grade_scale, GradeScale::Legacy);
        assert_eq!(config.materialize.concurrency, 4);
        assert!(config.materialize.clear_documents);
        assert_eq!(
            config.materialize.enrollment_date,
            NaiveDate::from_ymd_opt(2025, 9, 1)
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let file = write_config(
            ".yml",
            r#"
seed:
  enabled: false
  courses:
    count: 35
  bounds:
    min: 1
    max: 50
materialize:
  clear-documents: false
"#,
        );

        let config = ConfigFile::from_file(file.path()).unwrap();
        assert!(!config.seed.enabled);
        assert_eq!(config.seed.courses.count, 35);
        assert_eq!(config.seed.bounds.min, 1);
        assert_eq!(config.seed.bounds.max, 50);
        assert!(!config.materialize.clear_documents);
        assert_eq!(config.materialize.concurrency, DEFAULT_CONCURRENCY);
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = write_config(".ini", "[seed]\n");
        let err = ConfigFile::from_file(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported config file extension"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = ConfigFile::from_file("/nonexistent/seed.toml").unwrap_err();
        assert!(format!("{err:#}").contains("seed.toml"));
    }

    #[test]
    fn test_no_file_gives_defaults() {
        assert_eq!(load(None).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = ConfigFile::from_toml("[seed.students]\ncount = 250\n").unwrap();
        let overrides = SeedOverrides {
            students: Some(-5),
            enabled: Some(false),
            grade_scale: Some(GradeScale::Legacy),
            bounds_max: Some(500),
            ..SeedOverrides::default()
        };
        overrides.apply(&mut config.seed);

        assert_eq!(config.seed.students.count, -5);
        assert!(!config.seed.enabled);
        assert_eq!(config.seed.grade_scale, GradeScale::Legacy);
        assert_eq!(config.seed.bounds.max, 500);
        assert_eq!(config.seed.bounds.min, 10);
        assert_eq!(config.seed.courses.count, 20);
    }

    #[test]
    fn test_benchmark_table_and_overrides() {
        let mut config = ConfigFile::from_toml(
            r#"
[benchmark]
write-sizes = [10, 20]
filter-email = "student5@university.edu"
"#,
        )
        .unwrap();
        assert_eq!(config.benchmark.write_sizes, vec![10, 20]);
        assert_eq!(config.benchmark.filter_email, "student5@university.edu");
        assert_eq!(config.benchmark.update_limit, 100);
        assert!(config.benchmark.cleanup);

        BenchmarkArgs {
            write_sizes: Some(vec![5]),
            keep_records: true,
            ..BenchmarkArgs::default()
        }
        .apply(&mut config.benchmark);
        assert_eq!(config.benchmark.write_sizes, vec![5]);
        assert!(!config.benchmark.cleanup);
        assert_eq!(config.benchmark.filter_email, "student5@university.edu");
    }

    #[test]
    fn test_materialize_options_default_to_today() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut config = MaterializeConfig::default();
        assert_eq!(config.options(today).enrollment_date, today);

        MaterializeArgs {
            enrollment_date: NaiveDate::from_ymd_opt(2024, 2, 29),
            concurrency: Some(2),
            ..MaterializeArgs::default()
        }
        .apply(&mut config);
        let options = config.options(today);
        assert_eq!(options.enrollment_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(options.concurrency, 2);
        assert!(options.clear_documents);
    }
}
