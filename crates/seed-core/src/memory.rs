//! In-process store.

use crate::document::Patchable;
use crate::id::{DocumentId, StoreKey};
use crate::store::{PatchStore, Record, Store, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Store that keeps every record in memory.
///
/// Keys are allocated through [`StoreKey`]: relational stores hand out
/// 1, 2, 3, ... and document stores hand out random opaque strings.
/// `find_all` returns records in insertion order.
pub struct MemoryStore<K, T> {
    state: RwLock<MemoryState<K, T>>,
}

struct MemoryState<K, T> {
    sequence: u64,
    rows: BTreeMap<u64, Record<K, T>>,
    index: HashMap<K, u64>,
}

impl<K, T> MemoryStore<K, T>
where
    K: StoreKey,
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState {
                sequence: 0,
                rows: BTreeMap::new(),
                index: HashMap::new(),
            }),
        }
    }
}

impl<K, T> Default for MemoryStore<K, T>
where
    K: StoreKey,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, T> Store<K, T> for MemoryStore<K, T>
where
    K: StoreKey,
    T: Clone + Send + Sync + 'static,
{
    async fn save_all(&self, entities: Vec<T>) -> Result<Vec<Record<K, T>>, StoreError> {
        let mut state = self.state.write().await;
        let mut saved = Vec::with_capacity(entities.len());

        for entity in entities {
            state.sequence += 1;
            let sequence = state.sequence;
            let id = K::allocate(sequence);
            if state.index.contains_key(&id) {
                return Err(StoreError::Rejected(format!("duplicate key {id:?}")));
            }
            let record = Record::new(id.clone(), entity);
            state.index.insert(id, sequence);
            state.rows.insert(sequence, record.clone());
            saved.push(record);
        }

        Ok(saved)
    }

    async fn find_all(&self) -> Result<Vec<Record<K, T>>, StoreError> {
        let state = self.state.read().await;
        Ok(state.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &K) -> Result<Option<Record<K, T>>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .index
            .get(id)
            .and_then(|sequence| state.rows.get(sequence))
            .cloned())
    }

    async fn update(&self, id: &K, entity: T) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(sequence) = state.index.get(id).copied() else {
            return Ok(false);
        };
        match state.rows.get_mut(&sequence) {
            Some(record) => {
                record.data = entity;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.state.read().await.rows.len() as u64)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        state.rows.clear();
        state.index.clear();
        Ok(())
    }

    async fn delete_by_id(&self, id: &K) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.index.remove(id) {
            Some(sequence) => Ok(state.rows.remove(&sequence).is_some()),
            None => Ok(false),
        }
    }

    async fn exists_by_id(&self, id: &K) -> Result<bool, StoreError> {
        Ok(self.state.read().await.index.contains_key(id))
    }
}

#[async_trait]
impl<T> PatchStore<T> for MemoryStore<DocumentId, T>
where
    T: Patchable + Clone,
{
    async fn patch(&self, id: &DocumentId, patch: T::Patch) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(sequence) = state.index.get(id).copied() else {
            return Ok(false);
        };
        match state.rows.get_mut(&sequence) {
            Some(record) => {
                record.data.apply_patch(patch);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::RelationalId;

    #[tokio::test]
    async fn test_relational_keys_are_sequential() {
        let store: MemoryStore<RelationalId, String> = MemoryStore::new();

        let saved = store
            .save_all(vec!["a".to_string(), "b".to_string()])
            .await
            .unwrap();
        let single = store.save("c".to_string()).await.unwrap();

        assert_eq!(saved[0].id, 1);
        assert_eq!(saved[1].id, 2);
        assert_eq!(single.id, 3);
        assert_eq!(store.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store: MemoryStore<DocumentId, u32> = MemoryStore::new();
        store.save_all((0..20).collect()).await.unwrap();

        let values: Vec<u32> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.data)
            .collect();
        assert_eq!(values, (0..20).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_find_and_delete_by_id() {
        let store: MemoryStore<RelationalId, &'static str> = MemoryStore::new();
        let record = store.save("x").await.unwrap();

        assert!(store.exists_by_id(&record.id).await.unwrap());
        assert_eq!(
            store.find_by_id(&record.id).await.unwrap().map(|r| r.data),
            Some("x")
        );

        assert!(store.delete_by_id(&record.id).await.unwrap());
        assert!(!store.delete_by_id(&record.id).await.unwrap());
        assert!(!store.exists_by_id(&record.id).await.unwrap());
        assert!(store.find_by_id(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let store: MemoryStore<RelationalId, &'static str> = MemoryStore::new();
        store.save_all(vec!["a", "b"]).await.unwrap();

        assert!(store.update(&1, "z").await.unwrap());
        assert!(!store.update(&9, "y").await.unwrap());

        let values: Vec<_> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.id, r.data))
            .collect();
        assert_eq!(values, vec![(1, "z"), (2, "b")]);
    }

    #[tokio::test]
    async fn test_delete_all_keeps_key_sequence() {
        let store: MemoryStore<RelationalId, u8> = MemoryStore::new();
        store.save_all(vec![1, 2]).await.unwrap();
        store.delete_all().await.unwrap();

        assert_eq!(store.count().await.unwrap(), 0);
        let next = store.save(3).await.unwrap();
        assert_eq!(next.id, 3);
    }

    #[derive(Clone)]
    struct Counter {
        label: String,
        value: u32,
    }

    impl Patchable for Counter {
        type Patch = u32;

        fn apply_patch(&mut self, patch: u32) {
            self.value = patch;
        }
    }

    #[tokio::test]
    async fn test_patch_updates_in_place() {
        let store: MemoryStore<DocumentId, Counter> = MemoryStore::new();
        let record = store
            .save(Counter {
                label: "a".to_string(),
                value: 1,
            })
            .await
            .unwrap();

        assert!(store.patch(&record.id, 7).await.unwrap());

        let patched = store.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(patched.data.value, 7);
        assert_eq!(patched.data.label, "a");
    }

    #[tokio::test]
    async fn test_patch_missing_document_returns_false() {
        let store: MemoryStore<DocumentId, Counter> = MemoryStore::new();
        assert!(!store.patch(&DocumentId::new("missing"), 1).await.unwrap());
    }
}
