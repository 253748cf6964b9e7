//! Relational-key to document-key translation.

use crate::error::MaterializeError;
use seed_core::{DocumentId, EntityKind, RelationalId};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Maps the relational keys of one entity type to the keys of their
/// documents.
///
/// Each mapping is written once by the stage that creates the document and
/// only read afterwards. A second write for the same relational key is an
/// error, never an overwrite.
#[derive(Debug, Clone)]
pub struct IdTranslationTable {
    kind: EntityKind,
    entries: HashMap<RelationalId, DocumentId>,
}

impl IdTranslationTable {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Insert a mapping if the relational key has none yet.
    pub fn record(
        &mut self,
        relational_id: RelationalId,
        document_id: DocumentId,
    ) -> Result<(), MaterializeError> {
        match self.entries.entry(relational_id) {
            Entry::Vacant(slot) => {
                slot.insert(document_id);
                Ok(())
            }
            Entry::Occupied(existing) => Err(MaterializeError::DuplicateMapping {
                kind: self.kind,
                relational_id,
                existing: existing.get().clone(),
            }),
        }
    }

    pub fn resolve(&self, relational_id: RelationalId) -> Option<&DocumentId> {
        self.entries.get(&relational_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_resolve() {
        let mut table = IdTranslationTable::new(EntityKind::Course);
        table.record(1, DocumentId::new("a")).unwrap();
        table.record(2, DocumentId::new("b")).unwrap();

        assert_eq!(table.resolve(1), Some(&DocumentId::new("a")));
        assert_eq!(table.resolve(2), Some(&DocumentId::new("b")));
        assert_eq!(table.resolve(3), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_second_mapping_is_rejected_and_first_kept() {
        let mut table = IdTranslationTable::new(EntityKind::Instructor);
        table.record(7, DocumentId::new("first")).unwrap();

        let err = table.record(7, DocumentId::new("second")).unwrap_err();
        match err {
            MaterializeError::DuplicateMapping {
                kind,
                relational_id,
                existing,
            } => {
                assert_eq!(kind, EntityKind::Instructor);
                assert_eq!(relational_id, 7);
                assert_eq!(existing, DocumentId::new("first"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(table.resolve(7), Some(&DocumentId::new("first")));
    }

    #[test]
    fn test_new_table_is_empty() {
        let table = IdTranslationTable::new(EntityKind::Student);
        assert!(table.is_empty());
        assert_eq!(table.kind(), EntityKind::Student);
    }
}
