use crate::stage::Stage;
use seed_core::{DocumentId, EntityKind, RelationalId, StoreError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("{stage} failed: {source}")]
    Store {
        stage: Stage,
        #[source]
        source: StoreError,
    },

    /// Clearing the document stores or probing the relational side failed
    /// before any stage ran.
    #[error("Failed to prepare materialization: {0}")]
    Prepare(#[source] StoreError),

    #[error(
        "Course {course_id} references instructor {instructor_id}, which has no instructor document"
    )]
    UnresolvedInstructor {
        course_id: RelationalId,
        instructor_id: RelationalId,
    },

    #[error("{kind} key {relational_id} is already mapped to document {existing}")]
    DuplicateMapping {
        kind: EntityKind,
        relational_id: RelationalId,
        existing: DocumentId,
    },

    #[error("Store returned {returned} records for a chunk of {expected} in the {stage}")]
    ShortWrite {
        stage: Stage,
        expected: usize,
        returned: usize,
    },

    #[error("Materialization halted after the {0} failed")]
    Halted(Stage),
}

impl MaterializeError {
    pub(crate) fn store(stage: Stage) -> impl FnOnce(StoreError) -> Self {
        move |source| MaterializeError::Store { stage, source }
    }
}
