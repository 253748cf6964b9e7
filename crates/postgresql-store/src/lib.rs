//! PostgreSQL relational store for course-seed.
//!
//! Each relational entity maps to one table keyed by a `BIGSERIAL` id:
//!
//! | Entity       | Table         |
//! |--------------|---------------|
//! | `Student`    | `students`    |
//! | `Instructor` | `instructors` |
//! | `Course`     | `courses`     |
//! | `Enrollment` | `enrollments` |
//!
//! Referential integrity, unique emails and the grade range are enforced by
//! the schema as well as by the generator.
//!
//! # Example
//!
//! ```ignore
//! let client = postgresql_store::connect(
//!     "host=localhost user=postgres password=postgres dbname=university",
//! ).await?;
//! postgresql_store::create_schema(&client).await?;
//! let stores = postgresql_store::relational_stores(client);
//! ```

mod entity;
mod schema;
mod store;

pub use entity::PgEntity;
pub use schema::{create_schema, drop_schema, CREATE_TABLES, DROP_TABLES};
pub use store::{insert_sql, max_rows_per_statement, update_sql, PgStore};

use seed_core::{Course, Enrollment, Instructor, RelationalStores, StoreError, Student};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_postgres::{Client, NoTls};

/// Shared PostgreSQL client.
pub type SharedClient = Arc<Mutex<Client>>;

/// Connect and spawn the connection task.
pub async fn connect(connection_string: &str) -> Result<SharedClient, StoreError> {
    let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
        .await
        .map_err(StoreError::backend)?;

    // Spawn the connection task
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!("PostgreSQL connection error: {}", e);
        }
    });

    // Test connection
    client
        .simple_query("SELECT 1")
        .await
        .map_err(StoreError::backend)?;

    Ok(Arc::new(Mutex::new(client)))
}

/// Relational store bundle backed by one shared client.
pub fn relational_stores(client: SharedClient) -> RelationalStores {
    RelationalStores {
        students: Arc::new(PgStore::<Student>::new(client.clone())),
        instructors: Arc::new(PgStore::<Instructor>::new(client.clone())),
        courses: Arc::new(PgStore::<Course>::new(client.clone())),
        enrollments: Arc::new(PgStore::<Enrollment>::new(client)),
    }
}
