//! Relational schema DDL.

use crate::SharedClient;
use seed_core::StoreError;
use tracing::{debug, info};

/// Table definitions in dependency order.
pub const CREATE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS students (
        id BIGSERIAL PRIMARY KEY,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        date_of_birth DATE NOT NULL,
        phone_number VARCHAR(50),
        address VARCHAR(500),
        registration_date DATE NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS instructors (
        id BIGSERIAL PRIMARY KEY,
        first_name VARCHAR(255) NOT NULL,
        last_name VARCHAR(255) NOT NULL,
        email VARCHAR(255) NOT NULL UNIQUE,
        department VARCHAR(255) NOT NULL,
        phone_number VARCHAR(50),
        office_location VARCHAR(255),
        hire_date DATE NOT NULL,
        biography TEXT
    )",
    "CREATE TABLE IF NOT EXISTS courses (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(255) NOT NULL,
        description TEXT NOT NULL,
        instructor_id BIGINT NOT NULL REFERENCES instructors(id) ON DELETE CASCADE
    )",
    "CREATE TABLE IF NOT EXISTS enrollments (
        id BIGSERIAL PRIMARY KEY,
        student_id BIGINT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
        course_id BIGINT NOT NULL REFERENCES courses(id) ON DELETE CASCADE,
        grade DOUBLE PRECISION CHECK (grade IS NULL OR (grade >= 0 AND grade <= 100))
    )",
];

/// Drop statements in reverse dependency order.
pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS enrollments",
    "DROP TABLE IF EXISTS courses",
    "DROP TABLE IF EXISTS instructors",
    "DROP TABLE IF EXISTS students",
];

pub async fn create_schema(client: &SharedClient) -> Result<(), StoreError> {
    let client = client.lock().await;
    info!("Creating relational schema");
    for ddl in CREATE_TABLES {
        debug!("DDL: {}", ddl);
        client.execute(*ddl, &[]).await.map_err(StoreError::backend)?;
    }
    Ok(())
}

pub async fn drop_schema(client: &SharedClient) -> Result<(), StoreError> {
    let client = client.lock().await;
    info!("Dropping relational schema");
    for ddl in DROP_TABLES {
        client.execute(*ddl, &[]).await.map_err(StoreError::backend)?;
    }
    Ok(())
}
