//! Store performance comparison between the relational and document sides.
//!
//! Every timed operation goes through the store contract on the student
//! collections, so one run compares PostgreSQL with MongoDB just as well as
//! the in-memory stores. Benchmark records are recognised by their email
//! prefix and are removed before the run and, unless disabled, after it.

use crate::config::BenchmarkConfig;
use anyhow::Context;
use chrono::{DateTime, Months, NaiveDate, Utc};
use rand::Rng;
use seed_core::{
    DocumentId, DocumentStores, RelationalId, RelationalStores, Store, Student, StudentDocument,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};

/// Every benchmark email starts with this prefix.
pub const BENCHMARK_EMAIL_PREFIX: &str = "perftest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Write,
    FindAll,
    FindFilter,
    Count,
    FindSorted,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Write => "WRITE",
            Operation::FindAll => "FIND_ALL",
            Operation::FindFilter => "FIND_FILTER",
            Operation::Count => "COUNT",
            Operation::FindSorted => "FIND_SORTED",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One timed operation against one database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceResult {
    pub operation: Operation,
    pub database: String,
    pub record_count: u64,
    pub duration_ms: u64,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl fmt::Display for PerformanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} on {}: {} records in {} ms ({})",
            self.timestamp.format("%Y-%m-%dT%H:%M:%S"),
            self.operation,
            self.database,
            self.record_count,
            self.duration_ms,
            self.details
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    pub results: Vec<PerformanceResult>,
    /// Benchmark records removed before and after the timed operations.
    pub removed_records: u64,
}

impl BenchmarkReport {
    /// Results of one operation, in run order.
    pub fn operation(
        &self,
        operation: Operation,
    ) -> impl Iterator<Item = &PerformanceResult> + '_ {
        self.results
            .iter()
            .filter(move |result| result.operation == operation)
    }

    /// Log the results grouped by operation.
    pub fn log_summary(&self) {
        let mut by_operation: BTreeMap<Operation, Vec<&PerformanceResult>> = BTreeMap::new();
        for result in &self.results {
            by_operation.entry(result.operation).or_default().push(result);
        }

        info!("=== PERFORMANCE TEST SUMMARY ===");
        for (operation, results) in by_operation {
            info!("{} Operation:", operation);
            for r in results {
                info!(
                    "  {} - {} records in {} ms",
                    r.database, r.record_count, r.duration_ms
                );
            }
        }
    }
}

/// Display names of the two databases under test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseNames {
    pub relational: String,
    pub document: String,
}

/// A student shape the benchmark can synthesize and modify.
trait BenchmarkRecord: Clone + Send + Sync + 'static {
    fn synthetic(email: String, index: usize, today: NaiveDate) -> Self;
    fn email(&self) -> &str;
    fn last_name(&self) -> &str;
    fn set_phone_number(&mut self, phone: String);
}

fn birth_date(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(20 * 12)).unwrap_or(today)
}

impl BenchmarkRecord for Student {
    fn synthetic(email: String, index: usize, today: NaiveDate) -> Self {
        Student {
            first_name: format!("PerfTest{index}"),
            last_name: "Student".to_string(),
            email,
            date_of_birth: birth_date(today),
            phone_number: None,
            address: None,
            registration_date: today,
        }
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn set_phone_number(&mut self, phone: String) {
        self.phone_number = Some(phone);
    }
}

impl BenchmarkRecord for StudentDocument {
    fn synthetic(email: String, index: usize, today: NaiveDate) -> Self {
        StudentDocument {
            first_name: format!("PerfTest{index}"),
            last_name: "Student".to_string(),
            email,
            date_of_birth: birth_date(today),
            phone_number: None,
            address: None,
            registration_date: today,
            enrollments: Vec::new(),
        }
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn last_name(&self) -> &str {
        &self.last_name
    }

    fn set_phone_number(&mut self, phone: String) {
        self.phone_number = Some(phone);
    }
}

fn random_phone_numbers(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| format!("+43{}", rng.gen_range(0..999_999_999u32)))
        .collect()
}

/// The student store of one side.
struct Target<'a, K, T>
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    database: &'a str,
    store: &'a dyn Store<K, T>,
}

impl<K, T> Target<'_, K, T>
where
    K: Clone + Send + Sync + 'static,
    T: BenchmarkRecord,
{
    fn result(
        &self,
        operation: Operation,
        record_count: u64,
        start: Instant,
        details: &str,
    ) -> PerformanceResult {
        PerformanceResult {
            operation,
            database: self.database.to_string(),
            record_count,
            duration_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
            details: details.to_string(),
        }
    }

    async fn benchmark_ids(&self) -> anyhow::Result<Vec<K>> {
        Ok(self
            .store
            .find_all()
            .await
            .with_context(|| format!("Failed to list {} students", self.database))?
            .into_iter()
            .filter(|record| record.data.email().starts_with(BENCHMARK_EMAIL_PREFIX))
            .map(|record| record.id)
            .collect())
    }

    /// Delete every benchmark record. Not timed.
    async fn remove_benchmark_records(&self) -> anyhow::Result<u64> {
        let mut removed = 0;
        for id in self.benchmark_ids().await? {
            if self
                .store
                .delete_by_id(&id)
                .await
                .with_context(|| {
                    format!("Failed to remove {} benchmark record", self.database)
                })?
            {
                removed += 1;
            }
        }
        if removed > 0 {
            debug!("Removed {} benchmark records from {}", removed, self.database);
        }
        Ok(removed)
    }

    async fn write(&self, count: usize, today: NaiveDate) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} write: {} records", self.database, count);
        let start = Instant::now();
        let students = (0..count)
            .map(|i| {
                let email = format!("{BENCHMARK_EMAIL_PREFIX}{count}-{i}@test.com");
                T::synthetic(email, i, today)
            })
            .collect();
        let saved = self
            .store
            .save_all(students)
            .await
            .with_context(|| format!("{} write of {} records failed", self.database, count))?;
        Ok(self.result(
            Operation::Write,
            saved.len() as u64,
            start,
            "Batch insert students",
        ))
    }

    async fn find_all(&self) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} findAll", self.database);
        let start = Instant::now();
        let students = self
            .store
            .find_all()
            .await
            .with_context(|| format!("{} findAll failed", self.database))?;
        Ok(self.result(
            Operation::FindAll,
            students.len() as u64,
            start,
            "Find all students",
        ))
    }

    /// The store contract has no secondary index, so the filter is applied
    /// to a full scan.
    async fn find_by_filter(&self, email: &str) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} find by filter", self.database);
        let start = Instant::now();
        let found = self
            .store
            .find_all()
            .await
            .with_context(|| format!("{} find by filter failed", self.database))?
            .into_iter()
            .find(|record| record.data.email() == email);
        Ok(self.result(
            Operation::FindFilter,
            u64::from(found.is_some()),
            start,
            "Find by email",
        ))
    }

    async fn count(&self) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} count", self.database);
        let start = Instant::now();
        let count = self
            .store
            .count()
            .await
            .with_context(|| format!("{} count failed", self.database))?;
        Ok(self.result(Operation::Count, count, start, "Count all students"))
    }

    async fn find_sorted(&self) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} find sorted", self.database);
        let start = Instant::now();
        let mut students = self
            .store
            .find_all()
            .await
            .with_context(|| format!("{} find sorted failed", self.database))?;
        students.sort_by(|a, b| a.data.last_name().cmp(b.data.last_name()));
        Ok(self.result(
            Operation::FindSorted,
            students.len() as u64,
            start,
            "Find all sorted by lastName",
        ))
    }

    async fn update(&self, limit: usize) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} update", self.database);
        let start = Instant::now();
        let students = self
            .store
            .find_all()
            .await
            .with_context(|| format!("{} update failed", self.database))?;
        let batch: Vec<_> = students.into_iter().take(limit).collect();
        let phones = random_phone_numbers(batch.len());

        let mut updated = 0;
        for (mut record, phone) in batch.into_iter().zip(phones) {
            record.data.set_phone_number(phone);
            if self
                .store
                .update(&record.id, record.data)
                .await
                .with_context(|| format!("{} update failed", self.database))?
            {
                updated += 1;
            }
        }
        Ok(self.result(Operation::Update, updated, start, "Update phone numbers"))
    }

    /// Only the deletes are timed, not the lookup of the records to delete.
    async fn delete(&self, limit: usize) -> anyhow::Result<PerformanceResult> {
        info!("Testing {} delete", self.database);
        let ids: Vec<K> = self.benchmark_ids().await?.into_iter().take(limit).collect();

        let start = Instant::now();
        let mut deleted = 0;
        for id in &ids {
            if self
                .store
                .delete_by_id(id)
                .await
                .with_context(|| format!("{} delete failed", self.database))?
            {
                deleted += 1;
            }
        }
        Ok(self.result(Operation::Delete, deleted, start, "Delete test records"))
    }
}

/// Run every timed operation on both sides, relational first within each
/// pair.
pub async fn run_benchmark(
    config: &BenchmarkConfig,
    relational: &RelationalStores,
    documents: &DocumentStores,
    names: &DatabaseNames,
    today: NaiveDate,
) -> anyhow::Result<BenchmarkReport> {
    let sql: Target<'_, RelationalId, Student> = Target {
        database: &names.relational,
        store: relational.students.as_ref(),
    };
    let doc: Target<'_, DocumentId, StudentDocument> = Target {
        database: &names.document,
        store: documents.students.as_ref(),
    };

    info!("=== Starting Performance Tests ===");
    let mut removed_records =
        sql.remove_benchmark_records().await? + doc.remove_benchmark_records().await?;
    let mut results = Vec::new();

    for &count in &config.write_sizes {
        results.push(sql.write(count, today).await?);
        results.push(doc.write(count, today).await?);
    }

    results.push(sql.find_all().await?);
    results.push(doc.find_all().await?);
    results.push(sql.find_by_filter(&config.filter_email).await?);
    results.push(doc.find_by_filter(&config.filter_email).await?);
    results.push(sql.count().await?);
    results.push(doc.count().await?);
    results.push(sql.find_sorted().await?);
    results.push(doc.find_sorted().await?);

    results.push(sql.update(config.update_limit).await?);
    results.push(doc.update(config.update_limit).await?);

    results.push(sql.delete(config.delete_limit).await?);
    results.push(doc.delete(config.delete_limit).await?);

    if config.cleanup {
        removed_records +=
            sql.remove_benchmark_records().await? + doc.remove_benchmark_records().await?;
    }
    info!("=== Performance Tests Completed ===");

    let report = BenchmarkReport {
        results,
        removed_records,
    };
    report.log_summary();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn names() -> DatabaseNames {
        DatabaseNames {
            relational: "PostgreSQL".to_string(),
            document: "MongoDB".to_string(),
        }
    }

    fn small_config() -> BenchmarkConfig {
        BenchmarkConfig {
            write_sizes: vec![3, 5],
            update_limit: 2,
            delete_limit: 4,
            ..BenchmarkConfig::default()
        }
    }

    /// Both sides hold `student0@university.edu`, the default filter email.
    async fn stores_with_one_student() -> (RelationalStores, DocumentStores) {
        let relational = RelationalStores::in_memory();
        let documents = DocumentStores::in_memory();
        let email = "student0@university.edu".to_string();
        relational
            .students
            .save(Student::synthetic(email.clone(), 0, today()))
            .await
            .unwrap();
        documents
            .students
            .save(StudentDocument::synthetic(email, 0, today()))
            .await
            .unwrap();
        (relational, documents)
    }

    fn counts(report: &BenchmarkReport, operation: Operation) -> Vec<(String, u64)> {
        report
            .operation(operation)
            .map(|r| (r.database.clone(), r.record_count))
            .collect()
    }

    fn both(count: u64) -> Vec<(String, u64)> {
        vec![
            ("PostgreSQL".to_string(), count),
            ("MongoDB".to_string(), count),
        ]
    }

    #[tokio::test]
    async fn test_runs_every_operation_on_both_sides() {
        let (relational, documents) = stores_with_one_student().await;
        let report = run_benchmark(&small_config(), &relational, &documents, &names(), today())
            .await
            .unwrap();

        let operations: Vec<Operation> = report.results.iter().map(|r| r.operation).collect();
        assert_eq!(
            operations,
            vec![
                Operation::Write,
                Operation::Write,
                Operation::Write,
                Operation::Write,
                Operation::FindAll,
                Operation::FindAll,
                Operation::FindFilter,
                Operation::FindFilter,
                Operation::Count,
                Operation::Count,
                Operation::FindSorted,
                Operation::FindSorted,
                Operation::Update,
                Operation::Update,
                Operation::Delete,
                Operation::Delete,
            ]
        );

        assert_eq!(
            counts(&report, Operation::Write),
            vec![
                ("PostgreSQL".to_string(), 3),
                ("MongoDB".to_string(), 3),
                ("PostgreSQL".to_string(), 5),
                ("MongoDB".to_string(), 5),
            ]
        );
        assert_eq!(counts(&report, Operation::FindAll), both(9));
        assert_eq!(counts(&report, Operation::FindFilter), both(1));
        assert_eq!(counts(&report, Operation::Count), both(9));
        assert_eq!(counts(&report, Operation::FindSorted), both(9));
        assert_eq!(counts(&report, Operation::Update), both(2));
        assert_eq!(counts(&report, Operation::Delete), both(4));
    }

    #[tokio::test]
    async fn test_cleanup_leaves_only_existing_students() {
        let (relational, documents) = stores_with_one_student().await;
        let report = run_benchmark(&small_config(), &relational, &documents, &names(), today())
            .await
            .unwrap();

        // 8 written per side, 4 removed by the timed delete.
        assert_eq!(report.removed_records, 8);
        let remaining = relational.students.find_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].data.email, "student0@university.edu");
        assert_eq!(documents.students.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_keep_records_and_updated_phone_numbers() {
        let (relational, documents) = stores_with_one_student().await;
        let config = BenchmarkConfig {
            cleanup: false,
            ..small_config()
        };
        run_benchmark(&config, &relational, &documents, &names(), today())
            .await
            .unwrap();

        assert_eq!(relational.students.count().await.unwrap(), 5);
        assert_eq!(documents.students.count().await.unwrap(), 5);

        // The update touches the first records in store order.
        let first = &relational.students.find_all().await.unwrap()[0];
        assert!(first.data.phone_number.as_deref().unwrap().starts_with("+43"));
        let first = &documents.students.find_all().await.unwrap()[0];
        assert!(first.data.phone_number.as_deref().unwrap().starts_with("+43"));
    }

    #[tokio::test]
    async fn test_leftover_benchmark_records_are_removed_first() {
        let (relational, documents) = stores_with_one_student().await;
        relational
            .students
            .save(Student::synthetic("perftest3-0@test.com".to_string(), 0, today()))
            .await
            .unwrap();

        let report = run_benchmark(&small_config(), &relational, &documents, &names(), today())
            .await
            .unwrap();

        assert_eq!(counts(&report, Operation::FindAll), both(9));
        assert_eq!(report.removed_records, 9);
    }

    #[tokio::test]
    async fn test_filter_miss_reports_zero() {
        let config = BenchmarkConfig {
            filter_email: "nobody@university.edu".to_string(),
            write_sizes: vec![2],
            ..small_config()
        };
        let report = run_benchmark(
            &config,
            &RelationalStores::in_memory(),
            &DocumentStores::in_memory(),
            &names(),
            today(),
        )
        .await
        .unwrap();

        assert_eq!(counts(&report, Operation::FindFilter), both(0));
        assert_eq!(counts(&report, Operation::Count), both(2));
    }

    #[test]
    fn test_result_display_and_json() {
        let result = PerformanceResult {
            operation: Operation::FindSorted,
            database: "MongoDB".to_string(),
            record_count: 1000,
            duration_ms: 12,
            timestamp: DateTime::from_timestamp(1_750_000_000, 0).unwrap(),
            details: "Find all sorted by lastName".to_string(),
        };

        assert_eq!(
            result.to_string(),
            "[2025-06-15T15:06:40] FIND_SORTED on MongoDB: 1000 records in 12 ms (Find all sorted by lastName)"
        );
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["operation"], "FIND_SORTED");
        assert_eq!(value["record_count"], 1000);
    }
}
