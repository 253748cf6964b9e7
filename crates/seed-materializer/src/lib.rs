//! Relational-to-document materializer for course-seed.
//!
//! Reads the normalized relational dataset and writes denormalized documents
//! in four strictly ordered stages:
//!
//! ```text
//! ┌──────────────┐   instructor ids   ┌──────────┐   course ids   ┌──────────┐
//! │ Instructors  │ ─────────────────► │ Courses  │ ─────────────► │ Students │
//! └──────────────┘                    └──────────┘                └────┬─────┘
//!                                          ▲                           │
//!                                          │   merge-patch             │ student docs
//!                                          └──── CourseBackfill ◄──────┘
//! ```
//!
//! Relational keys are translated into document keys only through
//! [`IdTranslationTable`]s, each filled completely by its stage before a
//! later stage reads it. Courses are written once without their student
//! list and patched exactly once by the backfill stage, which breaks the
//! course/student embedding cycle.

pub mod builders;
pub mod error;
pub mod materializer;
pub mod report;
pub mod stage;
pub mod translation;

// Re-exports for convenience
pub use error::MaterializeError;
pub use materializer::{
    DocumentMaterializer, MaterializeOptions, MaterializeOutcome, MaterializeRun,
    DEFAULT_CHUNK_SIZE, DEFAULT_CONCURRENCY,
};
pub use report::{MaterializeReport, StageReport};
pub use stage::Stage;
pub use translation::IdTranslationTable;
