//! Abstract store contract.
//!
//! Both sides of the pipeline talk to their backing engines only through
//! [`Store`]. Keys are assigned by the store on save and returned inside a
//! [`Record`]; entities themselves stay key-free.
//!
//! Implementations:
//! - [`MemoryStore`](crate::MemoryStore) - in-process, used by the CLI default and tests
//! - `postgresql-store` - relational side on PostgreSQL
//! - `mongodb-store` - document side on MongoDB

use crate::document::{CourseDocument, InstructorDocument, Patchable, StudentDocument};
use crate::id::{DocumentId, RelationalId};
use crate::memory::MemoryStore;
use crate::model::{Course, Enrollment, Instructor, Student};
use async_trait::async_trait;
use std::sync::Arc;

/// An entity together with the key its store assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<K, T> {
    pub id: K,
    pub data: T,
}

impl<K, T> Record<K, T> {
    pub fn new(id: K, data: T) -> Self {
        Self { id, data }
    }
}

/// Errors surfaced by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing engine failed (connection, query, driver error).
    #[error("Store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A record could not be converted to or from the engine's format.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The store refused the write.
    #[error("Write rejected: {0}")]
    Rejected(String),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        StoreError::Backend(Box::new(err))
    }
}

/// Key/record store for one entity type.
///
/// A write is durable once the returned future resolves. `save_all` is the
/// batched write used by chunking callers; a failure there leaves any earlier
/// calls persisted.
#[async_trait]
pub trait Store<K, T>: Send + Sync
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    /// Persist a batch, returning one stored record per entity.
    ///
    /// Document stores return the records in input order.
    async fn save_all(&self, entities: Vec<T>) -> Result<Vec<Record<K, T>>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Record<K, T>>, StoreError>;

    async fn find_by_id(&self, id: &K) -> Result<Option<Record<K, T>>, StoreError>;

    /// Replace the entity stored under `id`.
    ///
    /// Returns `false` when no record with `id` exists.
    async fn update(&self, id: &K, entity: T) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: &K) -> Result<bool, StoreError>;

    async fn save(&self, entity: T) -> Result<Record<K, T>, StoreError> {
        self.save_all(vec![entity])
            .await?
            .pop()
            .ok_or_else(|| StoreError::Rejected("store returned no record for save".to_string()))
    }

    async fn exists_by_id(&self, id: &K) -> Result<bool, StoreError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Document store that supports merge-patch updates.
#[async_trait]
pub trait PatchStore<T: Patchable>: Store<DocumentId, T> {
    /// Apply `patch` to the stored document.
    ///
    /// Returns `false` when no document with `id` exists.
    async fn patch(&self, id: &DocumentId, patch: T::Patch) -> Result<bool, StoreError>;
}

/// Relational side: one store per entity type.
#[derive(Clone)]
pub struct RelationalStores {
    pub students: Arc<dyn Store<RelationalId, Student>>,
    pub instructors: Arc<dyn Store<RelationalId, Instructor>>,
    pub courses: Arc<dyn Store<RelationalId, Course>>,
    pub enrollments: Arc<dyn Store<RelationalId, Enrollment>>,
}

impl RelationalStores {
    pub fn in_memory() -> Self {
        Self {
            students: Arc::new(MemoryStore::<RelationalId, Student>::new()),
            instructors: Arc::new(MemoryStore::<RelationalId, Instructor>::new()),
            courses: Arc::new(MemoryStore::<RelationalId, Course>::new()),
            enrollments: Arc::new(MemoryStore::<RelationalId, Enrollment>::new()),
        }
    }
}

/// Document side: one collection per document type.
#[derive(Clone)]
pub struct DocumentStores {
    pub instructors: Arc<dyn Store<DocumentId, InstructorDocument>>,
    pub courses: Arc<dyn PatchStore<CourseDocument>>,
    pub students: Arc<dyn Store<DocumentId, StudentDocument>>,
}

impl DocumentStores {
    pub fn in_memory() -> Self {
        Self {
            instructors: Arc::new(MemoryStore::<DocumentId, InstructorDocument>::new()),
            courses: Arc::new(MemoryStore::<DocumentId, CourseDocument>::new()),
            students: Arc::new(MemoryStore::<DocumentId, StudentDocument>::new()),
        }
    }

    /// Remove every document from all three collections.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.students.delete_all().await?;
        self.courses.delete_all().await?;
        self.instructors.delete_all().await?;
        Ok(())
    }
}
