//! Seed configuration and the validated plan derived from it.

use crate::batch::DEFAULT_BATCH_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Target count for one entity type (`seed.<entity>.count`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    pub count: i64,
}

impl EntityCount {
    pub const fn new(count: i64) -> Self {
        Self { count }
    }
}

/// Inclusive bounds every configured count must respect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountBounds {
    pub min: i64,
    pub max: i64,
}

impl CountBounds {
    pub const DEFAULT_MIN: i64 = 10;
    pub const DEFAULT_MAX: i64 = 100_000;

    pub fn contains(&self, count: i64) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

impl Default for CountBounds {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Scale used for generated grades.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeScale {
    /// 0 to 100, the range enrollments are validated against.
    #[default]
    Percent,
    /// 1.0 to 5.0, the older grading scheme.
    Legacy,
}

impl GradeScale {
    pub fn range(&self) -> RangeInclusive<f64> {
        match self {
            GradeScale::Percent => 0.0..=100.0,
            GradeScale::Legacy => 1.0..=5.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeScale::Percent => "percent",
            GradeScale::Legacy => "legacy",
        }
    }
}

impl fmt::Display for GradeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeScale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" => Ok(GradeScale::Percent),
            "legacy" => Ok(GradeScale::Legacy),
            other => Err(format!(
                "unknown grade scale '{other}' (expected 'percent' or 'legacy')"
            )),
        }
    }
}

/// The `seed.*` configuration surface.
///
/// Counts are signed so that any value an operator can write (including a
/// negative one) reaches the guard and is rejected there with a bounds error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SeedConfig {
    /// Master switch.
    pub enabled: bool,
    pub students: EntityCount,
    pub instructors: EntityCount,
    pub courses: EntityCount,
    pub enrollments: EntityCount,
    /// Records per flush.
    pub batch_size: usize,
    /// Fixed seed for reproducible datasets; random when unset.
    pub random_seed: Option<u64>,
    pub grade_scale: GradeScale,
    pub bounds: CountBounds,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            students: EntityCount::new(100),
            instructors: EntityCount::new(10),
            courses: EntityCount::new(20),
            enrollments: EntityCount::new(200),
            batch_size: DEFAULT_BATCH_SIZE,
            random_seed: None,
            grade_scale: GradeScale::default(),
            bounds: CountBounds::default(),
        }
    }
}

/// A configuration that passed the guard.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPlan {
    pub students: u64,
    pub instructors: u64,
    pub courses: u64,
    pub enrollments: u64,
    pub batch_size: usize,
    pub random_seed: Option<u64>,
    pub grade_scale: GradeScale,
}

impl SeedPlan {
    pub fn total_records(&self) -> u64 {
        self.students + self.instructors + self.courses + self.enrollments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SeedConfig::default();
        assert!(config.enabled);
        assert_eq!(config.students.count, 100);
        assert_eq!(config.instructors.count, 10);
        assert_eq!(config.courses.count, 20);
        assert_eq!(config.enrollments.count, 200);
        assert_eq!(config.bounds, CountBounds { min: 10, max: 100_000 });
        assert_eq!(config.grade_scale, GradeScale::Percent);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let toml = r#"
enabled = false
batch-size = 250
random-seed = 7

[students]
count = 500
"#;
        let config: SeedConfig = toml::from_str(toml).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.students.count, 500);
        assert_eq!(config.instructors.count, 10);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.random_seed, Some(7));
    }

    #[test]
    fn test_yaml_with_grade_scale_and_bounds() {
        let yaml = r#"
grade-scale: legacy
bounds:
  max: 50
courses:
  count: 12
"#;
        let config: SeedConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.grade_scale, GradeScale::Legacy);
        assert_eq!(config.bounds.min, 10);
        assert_eq!(config.bounds.max, 50);
        assert_eq!(config.courses.count, 12);
    }

    #[test]
    fn test_grade_scale_parsing() {
        assert_eq!("Percent".parse::<GradeScale>(), Ok(GradeScale::Percent));
        assert_eq!("legacy".parse::<GradeScale>(), Ok(GradeScale::Legacy));
        assert!("letters".parse::<GradeScale>().is_err());
        assert_eq!(GradeScale::Legacy.range(), 1.0..=5.0);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = CountBounds::default();
        assert!(bounds.contains(10));
        assert!(bounds.contains(100_000));
        assert!(!bounds.contains(9));
        assert!(!bounds.contains(100_001));
    }
}
