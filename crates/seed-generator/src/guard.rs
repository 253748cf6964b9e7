//! Preconditions that decide whether a seed run happens at all.

use crate::config::{SeedConfig, SeedPlan};
use crate::error::GuardError;
use seed_core::{EntityKind, RelationalId, Store, Student};
use std::fmt;
use tracing::info;

/// Why a run was skipped. Skipping is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// `seed.enabled` is false.
    Disabled,
    /// The student store already holds records.
    AlreadySeeded { students: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => {
                f.write_str("seed data generation is disabled (seed.enabled=false)")
            }
            SkipReason::AlreadySeeded { students } => {
                write!(f, "database already contains {students} students")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuardDecision {
    Proceed(SeedPlan),
    Skip(SkipReason),
}

/// All-or-nothing gate in front of generation.
///
/// Bounds are validated first, so an invalid plan is reported even when the
/// run would otherwise be skipped.
pub struct SeedGuard<'a> {
    config: &'a SeedConfig,
}

impl<'a> SeedGuard<'a> {
    pub fn new(config: &'a SeedConfig) -> Self {
        Self { config }
    }

    /// Validate counts, bounds and batch size without touching any store.
    pub fn validate(&self) -> Result<SeedPlan, GuardError> {
        let config = self.config;
        let bounds = config.bounds;
        if bounds.min > bounds.max {
            return Err(GuardError::InvalidBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        if config.batch_size == 0 {
            return Err(GuardError::InvalidBatchSize(config.batch_size));
        }

        let checked = |kind: EntityKind, count: i64| -> Result<u64, GuardError> {
            let out_of_bounds = || GuardError::CountOutOfBounds {
                kind,
                count,
                min: bounds.min,
                max: bounds.max,
            };
            if !bounds.contains(count) {
                return Err(out_of_bounds());
            }
            u64::try_from(count).map_err(|_| out_of_bounds())
        };

        Ok(SeedPlan {
            students: checked(EntityKind::Student, config.students.count)?,
            instructors: checked(EntityKind::Instructor, config.instructors.count)?,
            courses: checked(EntityKind::Course, config.courses.count)?,
            enrollments: checked(EntityKind::Enrollment, config.enrollments.count)?,
            batch_size: config.batch_size,
            random_seed: config.random_seed,
            grade_scale: config.grade_scale,
        })
    }

    /// Decide whether the run proceeds.
    ///
    /// Probes the student store only after the configuration is known to be
    /// valid and seeding is enabled.
    pub async fn check(
        &self,
        students: &dyn Store<RelationalId, Student>,
    ) -> Result<GuardDecision, GuardError> {
        let plan = self.validate()?;

        if !self.config.enabled {
            info!("Seed data generation is disabled. Set seed.enabled=true to enable.");
            return Ok(GuardDecision::Skip(SkipReason::Disabled));
        }

        let existing = students.count().await?;
        if existing > 0 {
            info!(
                "Database already contains {} students. Skipping seeding.",
                existing
            );
            return Ok(GuardDecision::Skip(SkipReason::AlreadySeeded {
                students: existing,
            }));
        }

        Ok(GuardDecision::Proceed(plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EntityCount;
    use chrono::NaiveDate;
    use seed_core::MemoryStore;

    fn student() -> Student {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        Student {
            first_name: "Emma0".to_string(),
            last_name: "Smith".to_string(),
            email: "student0@university.edu".to_string(),
            date_of_birth: date,
            phone_number: None,
            address: None,
            registration_date: date,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = SeedConfig::default();
        let plan = SeedGuard::new(&config).validate().unwrap();
        assert_eq!(plan.students, 100);
        assert_eq!(plan.enrollments, 200);
        assert_eq!(plan.total_records(), 330);
    }

    #[test]
    fn test_bounds_are_inclusive_at_both_ends() {
        for count in [10, 11, 99_999, 100_000] {
            let config = SeedConfig {
                courses: EntityCount::new(count),
                ..SeedConfig::default()
            };
            assert!(SeedGuard::new(&config).validate().is_ok(), "count {count}");
        }
    }

    #[test]
    fn test_out_of_bounds_counts_are_rejected() {
        for count in [i64::MIN, -1, 0, 9, 100_001, i64::MAX] {
            let config = SeedConfig {
                enrollments: EntityCount::new(count),
                ..SeedConfig::default()
            };
            let err = SeedGuard::new(&config).validate().unwrap_err();
            match err {
                GuardError::CountOutOfBounds { kind, count: got, .. } => {
                    assert_eq!(kind, EntityKind::Enrollment);
                    assert_eq!(got, count);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn test_error_message_names_entity_and_count() {
        let config = SeedConfig {
            students: EntityCount::new(5),
            ..SeedConfig::default()
        };
        let err = SeedGuard::new(&config).validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Seed count for students must be between 10 and 100000. Got: 5"
        );
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let mut config = SeedConfig::default();
        config.bounds.min = 500;
        config.bounds.max = 100;
        assert!(matches!(
            SeedGuard::new(&config).validate(),
            Err(GuardError::InvalidBounds { min: 500, max: 100 })
        ));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = SeedConfig {
            batch_size: 0,
            ..SeedConfig::default()
        };
        assert!(matches!(
            SeedGuard::new(&config).validate(),
            Err(GuardError::InvalidBatchSize(0))
        ));
    }

    #[tokio::test]
    async fn test_disabled_run_is_skipped() {
        let store: MemoryStore<RelationalId, Student> = MemoryStore::new();
        let config = SeedConfig {
            enabled: false,
            ..SeedConfig::default()
        };

        let decision = SeedGuard::new(&config).check(&store).await.unwrap();
        assert_eq!(decision, GuardDecision::Skip(SkipReason::Disabled));
    }

    #[tokio::test]
    async fn test_invalid_counts_fail_even_when_disabled() {
        let store: MemoryStore<RelationalId, Student> = MemoryStore::new();
        let config = SeedConfig {
            enabled: false,
            instructors: EntityCount::new(1),
            ..SeedConfig::default()
        };

        assert!(SeedGuard::new(&config).check(&store).await.is_err());
    }

    #[tokio::test]
    async fn test_populated_store_is_skipped() {
        let store: MemoryStore<RelationalId, Student> = MemoryStore::new();
        store.save(student()).await.unwrap();

        let config = SeedConfig::default();
        let decision = SeedGuard::new(&config).check(&store).await.unwrap();
        assert_eq!(
            decision,
            GuardDecision::Skip(SkipReason::AlreadySeeded { students: 1 })
        );
    }

    #[tokio::test]
    async fn test_empty_store_proceeds() {
        let store: MemoryStore<RelationalId, Student> = MemoryStore::new();
        let config = SeedConfig::default();

        let decision = SeedGuard::new(&config).check(&store).await.unwrap();
        assert!(matches!(decision, GuardDecision::Proceed(plan) if plan.students == 100));
    }
}
