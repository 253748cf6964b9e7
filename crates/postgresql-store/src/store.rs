//! `Store` implementation over one PostgreSQL table.

use crate::entity::PgEntity;
use crate::SharedClient;
use async_trait::async_trait;
use seed_core::{Record, RelationalId, Store, StoreError};
use std::marker::PhantomData;
use tokio_postgres::types::ToSql;
use tracing::debug;

/// PostgreSQL caps a statement at 65535 bind parameters.
const MAX_PARAMS: usize = 65_535;

/// Rows per INSERT statement for an entity with `columns` columns.
pub fn max_rows_per_statement(columns: usize) -> usize {
    (MAX_PARAMS / columns.max(1)).max(1)
}

/// Build a multi-row `INSERT` for `rows` rows that returns every inserted
/// row, id first.
pub fn insert_sql(table: &str, columns: &[&str], rows: usize) -> String {
    let mut param_idx = 1;
    let placeholders: Vec<String> = (0..rows)
        .map(|_| {
            let row: Vec<String> = columns
                .iter()
                .map(|_| {
                    let p = format!("${param_idx}");
                    param_idx += 1;
                    p
                })
                .collect();
            format!("({})", row.join(", "))
        })
        .collect();

    let columns = columns.join(", ");
    format!(
        "INSERT INTO {table} ({columns}) VALUES {} RETURNING id, {columns}",
        placeholders.join(", ")
    )
}

/// Build an `UPDATE` of every column by id. The id binds last.
pub fn update_sql(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = ${}",
        assignments.join(", "),
        columns.len() + 1
    )
}

fn select_sql<T: PgEntity>() -> String {
    format!("SELECT id, {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

/// Store for one relational entity type.
pub struct PgStore<T> {
    client: SharedClient,
    _entity: PhantomData<fn() -> T>,
}

impl<T: PgEntity> PgStore<T> {
    pub fn new(client: SharedClient) -> Self {
        Self {
            client,
            _entity: PhantomData,
        }
    }

    fn record(row: &tokio_postgres::Row) -> Result<Record<RelationalId, T>, StoreError> {
        let id: i64 = row.try_get("id").map_err(StoreError::backend)?;
        let data = T::from_row(row).map_err(StoreError::backend)?;
        Ok(Record::new(id, data))
    }
}

#[async_trait]
impl<T: PgEntity> Store<RelationalId, T> for PgStore<T> {
    /// Inserts in one transaction, split into statements that stay under the
    /// bind parameter limit.
    ///
    /// Each record is decoded from its own `RETURNING` row. PostgreSQL leaves
    /// the order of those rows unspecified, so records come back sorted by id.
    async fn save_all(
        &self,
        entities: Vec<T>,
    ) -> Result<Vec<Record<RelationalId, T>>, StoreError> {
        if entities.is_empty() {
            return Ok(Vec::new());
        }

        let mut client = self.client.lock().await;
        let tx = client.transaction().await.map_err(StoreError::backend)?;

        let mut records = Vec::with_capacity(entities.len());
        for chunk in entities.chunks(max_rows_per_statement(T::COLUMNS.len())) {
            let sql = insert_sql(T::TABLE, T::COLUMNS, chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> =
                chunk.iter().flat_map(|entity| entity.params()).collect();

            let rows = tx.query(&sql, &params).await.map_err(StoreError::backend)?;
            if rows.len() != chunk.len() {
                return Err(StoreError::Rejected(format!(
                    "{} returned {} ids for {} rows",
                    T::TABLE,
                    rows.len(),
                    chunk.len()
                )));
            }
            for row in &rows {
                records.push(Self::record(row)?);
            }
        }

        tx.commit().await.map_err(StoreError::backend)?;
        debug!("Inserted {} rows into {}", records.len(), T::TABLE);

        records.sort_by_key(|record| record.id);
        Ok(records)
    }

    async fn find_all(&self) -> Result<Vec<Record<RelationalId, T>>, StoreError> {
        let client = self.client.lock().await;
        let sql = format!("{} ORDER BY id", select_sql::<T>());
        let rows = client.query(&sql, &[]).await.map_err(StoreError::backend)?;
        rows.iter().map(Self::record).collect()
    }

    async fn find_by_id(
        &self,
        id: &RelationalId,
    ) -> Result<Option<Record<RelationalId, T>>, StoreError> {
        let client = self.client.lock().await;
        let sql = format!("{} WHERE id = $1", select_sql::<T>());
        let row = client
            .query_opt(&sql, &[id])
            .await
            .map_err(StoreError::backend)?;
        row.as_ref().map(Self::record).transpose()
    }

    async fn update(&self, id: &RelationalId, entity: T) -> Result<bool, StoreError> {
        let client = self.client.lock().await;
        let sql = update_sql(T::TABLE, T::COLUMNS);
        let mut params = entity.params();
        params.push(id);
        let updated = client
            .execute(&sql, &params)
            .await
            .map_err(StoreError::backend)?;
        Ok(updated > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let client = self.client.lock().await;
        let sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        let row = client
            .query_one(&sql, &[])
            .await
            .map_err(StoreError::backend)?;
        let count: i64 = row.try_get(0).map_err(StoreError::backend)?;
        Ok(count as u64)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let client = self.client.lock().await;
        let sql = format!("DELETE FROM {}", T::TABLE);
        client
            .execute(&sql, &[])
            .await
            .map_err(StoreError::backend)?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &RelationalId) -> Result<bool, StoreError> {
        let client = self.client.lock().await;
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let deleted = client
            .execute(&sql, &[id])
            .await
            .map_err(StoreError::backend)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seed_core::{Enrollment, Student};

    #[test]
    fn test_insert_sql_numbers_placeholders_row_major() {
        let sql = insert_sql("enrollments", &["student_id", "course_id", "grade"], 2);
        assert_eq!(
            sql,
            "INSERT INTO enrollments (student_id, course_id, grade) \
             VALUES ($1, $2, $3), ($4, $5, $6) \
             RETURNING id, student_id, course_id, grade"
        );
    }

    #[test]
    fn test_update_sql_binds_id_last() {
        assert_eq!(
            update_sql("courses", &["name", "description", "instructor_id"]),
            "UPDATE courses SET name = $1, description = $2, instructor_id = $3 WHERE id = $4"
        );
    }

    #[test]
    fn test_max_rows_stays_under_parameter_limit() {
        assert_eq!(max_rows_per_statement(3), 21_845);
        assert!(max_rows_per_statement(8) * 8 <= MAX_PARAMS);
        assert_eq!(max_rows_per_statement(0), MAX_PARAMS);
    }

    #[test]
    fn test_select_sql_lists_id_first() {
        assert_eq!(
            select_sql::<Enrollment>(),
            "SELECT id, student_id, course_id, grade FROM enrollments"
        );
        assert!(select_sql::<Student>().starts_with("SELECT id, first_name, last_name, email"));
    }
}
