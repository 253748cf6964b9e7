//! MongoDB document store for course-seed.
//!
//! One collection per document type (`instructors`, `courses`, `students`).
//! Document keys are the hex form of the `_id` ObjectId the server assigns on
//! insert.

mod store;

pub use store::{MongoDocument, MongoStore};

use mongodb::{Client, Database};
use seed_core::{CourseDocument, DocumentStores, InstructorDocument, StoreError, StudentDocument};
use std::sync::Arc;

/// Connect and return a handle to `database_name`.
pub async fn connect(connection_string: &str, database_name: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(connection_string)
        .await
        .map_err(StoreError::backend)?;
    let database = client.database(database_name);

    // Test connection
    database
        .list_collection_names()
        .await
        .map_err(StoreError::backend)?;

    Ok(database)
}

pub fn document_stores(database: &Database) -> DocumentStores {
    DocumentStores {
        instructors: Arc::new(MongoStore::<InstructorDocument>::new(database)),
        courses: Arc::new(MongoStore::<CourseDocument>::new(database)),
        students: Arc::new(MongoStore::<StudentDocument>::new(database)),
    }
}
