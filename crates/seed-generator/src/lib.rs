//! Synthetic dataset generator for course-seed.
//!
//! This crate produces a referentially consistent relational dataset
//! (students, instructors, courses, enrollments) and writes it through
//! fixed-size batches. Generation is driven by a seeded RNG so the same seed
//! reproduces the same dataset.
//!
//! # Architecture
//!
//! ```text
//! SeedConfig ──► SeedGuard ──► SeedPlan
//!                                 │
//!                                 ▼
//!                      ┌─────────────────────┐
//!                      │  EntityGenerator    │
//!                      │  - rng (injected)   │
//!                      │  - today            │
//!                      │  - grade scale      │
//!                      └─────────┬───────────┘
//!                                │ entities
//!                                ▼
//!                      BatchWriter ──► Store::save_all (chunks)
//! ```
//!
//! Entity types are generated in dependency order: students and instructors
//! first, then courses (which reference instructors), then enrollments
//! (which reference students and courses).

pub mod batch;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod guard;
mod pools;

// Re-exports for convenience
pub use batch::{BatchMetrics, BatchWriter, DEFAULT_BATCH_SIZE};
pub use config::{CountBounds, EntityCount, GradeScale, SeedConfig, SeedPlan};
pub use dataset::{generate_dataset, DatasetReport};
pub use error::{GeneratorError, GuardError};
pub use generator::EntityGenerator;
pub use guard::{GuardDecision, SeedGuard, SkipReason};
