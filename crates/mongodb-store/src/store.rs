//! `Store` and `PatchStore` over one MongoDB collection.

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use seed_core::{
    CourseDocument, DocumentId, InstructorDocument, PatchStore, Patchable, Record, Store,
    StoreError, StudentDocument,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use tracing::debug;

/// A document type stored in its own collection.
pub trait MongoDocument: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;
}

impl MongoDocument for InstructorDocument {
    const COLLECTION: &'static str = "instructors";
}

impl MongoDocument for CourseDocument {
    const COLLECTION: &'static str = "courses";
}

impl MongoDocument for StudentDocument {
    const COLLECTION: &'static str = "students";
}

fn serialization<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Serialization(e.to_string())
}

/// Filter on `_id`, or `None` when `id` cannot name a stored document.
fn id_filter(id: &DocumentId) -> Option<Document> {
    ObjectId::parse_str(id.as_str())
        .ok()
        .map(|oid| doc! { "_id": oid })
}

fn document_id(id: &Bson) -> Result<DocumentId, StoreError> {
    match id {
        Bson::ObjectId(oid) => Ok(DocumentId::new(oid.to_hex())),
        Bson::String(s) => Ok(DocumentId::new(s.as_str())),
        other => Err(StoreError::Serialization(format!(
            "unsupported _id type: {other:?}"
        ))),
    }
}

pub struct MongoStore<T> {
    collection: Collection<Document>,
    _document: PhantomData<fn() -> T>,
}

impl<T: MongoDocument> MongoStore<T> {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(T::COLLECTION),
            _document: PhantomData,
        }
    }

    fn record(mut raw: Document) -> Result<Record<DocumentId, T>, StoreError> {
        let id = raw
            .remove("_id")
            .ok_or_else(|| StoreError::Serialization("document without _id".to_string()))?;
        let id = document_id(&id)?;
        let data = bson::from_document(raw).map_err(serialization)?;
        Ok(Record::new(id, data))
    }
}

#[async_trait]
impl<T: MongoDocument> Store<DocumentId, T> for MongoStore<T> {
    async fn save_all(&self, entities: Vec<T>) -> Result<Vec<Record<DocumentId, T>>, StoreError> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let documents = entities
            .iter()
            .map(bson::to_document)
            .collect::<Result<Vec<_>, _>>()
            .map_err(serialization)?;

        let result = self
            .collection
            .insert_many(documents)
            .await
            .map_err(StoreError::backend)?;
        debug!(
            "Inserted {} documents into {}",
            result.inserted_ids.len(),
            T::COLLECTION
        );

        entities
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                let id = result.inserted_ids.get(&index).ok_or_else(|| {
                    StoreError::Rejected(format!(
                        "{} returned no id for document {index}",
                        T::COLLECTION
                    ))
                })?;
                Ok(Record::new(document_id(id)?, data))
            })
            .collect()
    }

    async fn find_all(&self) -> Result<Vec<Record<DocumentId, T>>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(StoreError::backend)?;
        let raw: Vec<Document> = cursor.try_collect().await.map_err(StoreError::backend)?;
        raw.into_iter().map(Self::record).collect()
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Record<DocumentId, T>>, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(None);
        };
        let raw = self
            .collection
            .find_one(filter)
            .await
            .map_err(StoreError::backend)?;
        raw.map(Self::record).transpose()
    }

    async fn update(&self, id: &DocumentId, entity: T) -> Result<bool, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(false);
        };
        let replacement = bson::to_document(&entity).map_err(serialization)?;
        let result = self
            .collection
            .replace_one(filter, replacement)
            .await
            .map_err(StoreError::backend)?;
        Ok(result.matched_count > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.collection
            .count_documents(doc! {})
            .await
            .map_err(StoreError::backend)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.collection
            .delete_many(doc! {})
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &DocumentId) -> Result<bool, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(false);
        };
        let result = self
            .collection
            .delete_one(filter)
            .await
            .map_err(StoreError::backend)?;
        Ok(result.deleted_count > 0)
    }
}

#[async_trait]
impl<T> PatchStore<T> for MongoStore<T>
where
    T: MongoDocument + Patchable,
{
    /// Applies the set fields of `patch` with `$set`.
    async fn patch(&self, id: &DocumentId, patch: T::Patch) -> Result<bool, StoreError> {
        let Some(filter) = id_filter(id) else {
            return Ok(false);
        };
        let fields = bson::to_document(&patch).map_err(serialization)?;
        if fields.is_empty() {
            // An empty $set is rejected by the server.
            return self.exists_by_id(id).await;
        }

        let result = self
            .collection
            .update_one(filter, doc! { "$set": fields })
            .await
            .map_err(StoreError::backend)?;
        Ok(result.matched_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_filter_accepts_object_id_hex_only() {
        let oid = ObjectId::new();
        let filter = id_filter(&DocumentId::new(oid.to_hex())).unwrap();
        assert_eq!(filter.get_object_id("_id").unwrap(), oid);

        assert!(id_filter(&DocumentId::new("not-an-object-id")).is_none());
    }

    #[test]
    fn test_document_id_from_bson() {
        let oid = ObjectId::new();
        assert_eq!(
            document_id(&Bson::ObjectId(oid)).unwrap(),
            DocumentId::new(oid.to_hex())
        );
        assert_eq!(
            document_id(&Bson::String("abc".to_string())).unwrap(),
            DocumentId::new("abc")
        );
        assert!(document_id(&Bson::Int32(1)).is_err());
    }

    #[test]
    fn test_course_patch_becomes_camel_case_set() {
        let patch = seed_core::CoursePatch::enrolled_students(Vec::new());
        let fields = bson::to_document(&patch).unwrap();
        assert!(fields.contains_key("enrolledStudents"));
        assert!(bson::to_document(&seed_core::CoursePatch::default())
            .unwrap()
            .is_empty());
    }
}
