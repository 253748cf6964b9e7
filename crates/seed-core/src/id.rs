//! Identifier spaces.
//!
//! Relational entities are keyed by auto-increment integers; documents are
//! keyed by opaque strings assigned by the document store. The two spaces
//! never mix: crossing from one to the other goes through a translation
//! table built during materialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Auto-increment key of a relational entity.
pub type RelationalId = i64;

/// Opaque identifier of a materialized document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Key types an in-process store can allocate on its own.
///
/// `sequence` starts at 1 and grows by one per saved record.
pub trait StoreKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    fn allocate(sequence: u64) -> Self;
}

impl StoreKey for RelationalId {
    fn allocate(sequence: u64) -> Self {
        sequence as RelationalId
    }
}

impl StoreKey for DocumentId {
    fn allocate(_sequence: u64) -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}
