//! Error types for generation and guard checks.

use seed_core::{EntityKind, StoreError};
use thiserror::Error;

/// Errors that can occur while generating and writing entities.
#[derive(Error, Debug)]
pub enum GeneratorError {
    /// A batch write failed. Earlier batches stay persisted.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A dependent entity type was generated before its parents existed.
    #[error("Cannot generate {kind}: no persisted {parent} to reference")]
    MissingParents {
        kind: EntityKind,
        parent: EntityKind,
    },

    /// Chunk size must be at least one.
    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),
}

/// Errors raised by the seed guard. Any of these aborts the run before a
/// single record is written.
#[derive(Error, Debug)]
pub enum GuardError {
    #[error("Seed count for {kind} must be between {min} and {max}. Got: {count}")]
    CountOutOfBounds {
        kind: EntityKind,
        count: i64,
        min: i64,
        max: i64,
    },

    #[error("Invalid seed bounds: min {min} is greater than max {max}")]
    InvalidBounds { min: i64, max: i64 },

    #[error("Invalid batch size: {0}")]
    InvalidBatchSize(usize),

    /// Counting the existing students failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
