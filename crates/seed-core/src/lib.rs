//! Core types for the course-seed pipeline.
//!
//! This crate provides the foundational types shared by the generator, the
//! materializer and the store adapters:
//!
//! - [`RelationalId`] / [`DocumentId`] - the two identifier spaces
//! - [`Student`], [`Instructor`], [`Course`], [`Enrollment`] - relational entities
//! - [`InstructorDocument`], [`CourseDocument`], [`StudentDocument`] - denormalized documents
//! - [`Store`] / [`PatchStore`] - the abstract store contract
//! - [`MemoryStore`] - an in-process store implementation
//!
//! # Architecture
//!
//! ```text
//! seed-core (this crate)
//!    │
//!    ├─── seed-generator     (writes relational entities through Store)
//!    ├─── seed-materializer  (reads relational, writes documents)
//!    │
//!    ├─── postgresql-store   (implements Store<RelationalId, _>)
//!    └─── mongodb-store      (implements Store<DocumentId, _> + PatchStore)
//! ```

pub mod document;
pub mod id;
pub mod memory;
pub mod model;
pub mod store;

// Re-exports for convenience
pub use document::{
    CourseDocument, CoursePatch, EnrollmentInfo, InstructorDocument, InstructorInfo, Patchable,
    StudentDocument, StudentInfo,
};
pub use id::{DocumentId, RelationalId, StoreKey};
pub use memory::MemoryStore;
pub use model::{Course, Enrollment, EntityKind, Instructor, Student};
pub use store::{DocumentStores, PatchStore, Record, RelationalStores, Store, StoreError};
