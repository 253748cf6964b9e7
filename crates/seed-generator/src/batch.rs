//! Chunked writes with a bounded buffer.
//!
//! Chunks are independent writes. If one fails, the remaining input is
//! abandoned but every chunk flushed before it stays persisted: a generation
//! run is not transactional across chunks. This keeps peak memory at one
//! chunk regardless of the target volume.

use crate::error::GeneratorError;
use seed_core::{Store, StoreError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default batch size for chunked writes.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Metrics from a chunked write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchMetrics {
    /// Number of records persisted.
    pub rows_written: u64,
    /// Number of non-empty flushes.
    pub batch_count: u64,
    /// Time spent inside the store.
    pub write_duration: Duration,
}

impl BatchMetrics {
    /// Calculate rows per second of store time.
    pub fn rows_per_second(&self) -> f64 {
        if self.write_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.write_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Buffers records of one type and flushes them to a store in chunks of at
/// most `chunk_size`.
pub struct BatchWriter<'a, K, T> {
    store: &'a dyn Store<K, T>,
    chunk_size: usize,
    buffer: Vec<T>,
    metrics: BatchMetrics,
}

impl<'a, K, T> BatchWriter<'a, K, T>
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub fn new(store: &'a dyn Store<K, T>, chunk_size: usize) -> Result<Self, GeneratorError> {
        if chunk_size == 0 {
            return Err(GeneratorError::InvalidBatchSize(chunk_size));
        }
        Ok(Self {
            store,
            chunk_size,
            buffer: Vec::with_capacity(chunk_size),
            metrics: BatchMetrics::default(),
        })
    }

    /// Write every item of `items` in chunks and return the metrics.
    pub async fn write_all<I>(
        store: &'a dyn Store<K, T>,
        chunk_size: usize,
        items: I,
    ) -> Result<BatchMetrics, GeneratorError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut writer = Self::new(store, chunk_size)?;
        for item in items {
            writer.push(item).await?;
        }
        Ok(writer.finish().await?)
    }

    /// Buffer one record, flushing when the buffer reaches the chunk size.
    pub async fn push(&mut self, item: T) -> Result<(), StoreError> {
        self.buffer.push(item);
        if self.buffer.len() >= self.chunk_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush the remainder and return the metrics.
    pub async fn finish(mut self) -> Result<BatchMetrics, StoreError> {
        self.flush().await?;
        Ok(self.metrics)
    }

    /// Records currently buffered and not yet persisted.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn metrics(&self) -> &BatchMetrics {
        &self.metrics
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        // The chunk leaves the buffer before the write, so a failed chunk is
        // never retried by a later flush.
        let chunk = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.chunk_size));
        let len = chunk.len() as u64;

        let start = Instant::now();
        self.store.save_all(chunk).await?;
        self.metrics.write_duration += start.elapsed();

        self.metrics.rows_written += len;
        self.metrics.batch_count += 1;

        debug!(
            "Batch {} complete: {} records flushed, {} total",
            self.metrics.batch_count, len, self.metrics.rows_written
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seed_core::{MemoryStore, Record, RelationalId};
    use std::sync::Mutex;

    /// Store that records every chunk it receives and can reject one of them.
    struct ChunkRecorder {
        inner: MemoryStore<RelationalId, u32>,
        chunks: Mutex<Vec<Vec<u32>>>,
        fail_on_chunk: Option<usize>,
    }

    impl ChunkRecorder {
        fn new(fail_on_chunk: Option<usize>) -> Self {
            Self {
                inner: MemoryStore::new(),
                chunks: Mutex::new(Vec::new()),
                fail_on_chunk,
            }
        }

        fn chunks(&self) -> Vec<Vec<u32>> {
            self.chunks.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Store<RelationalId, u32> for ChunkRecorder {
        async fn save_all(
            &self,
            entities: Vec<u32>,
        ) -> Result<Vec<Record<RelationalId, u32>>, StoreError> {
            let attempt = {
                let mut chunks = self.chunks.lock().unwrap();
                chunks.push(entities.clone());
                chunks.len() - 1
            };
            if self.fail_on_chunk == Some(attempt) {
                return Err(StoreError::Rejected(format!("chunk {attempt} rejected")));
            }
            self.inner.save_all(entities).await
        }

        async fn find_all(&self) -> Result<Vec<Record<RelationalId, u32>>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_by_id(
            &self,
            id: &RelationalId,
        ) -> Result<Option<Record<RelationalId, u32>>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn update(&self, id: &RelationalId, entity: u32) -> Result<bool, StoreError> {
            self.inner.update(id, entity).await
        }

        async fn count(&self) -> Result<u64, StoreError> {
            self.inner.count().await
        }

        async fn delete_all(&self) -> Result<(), StoreError> {
            self.inner.delete_all().await
        }

        async fn delete_by_id(&self, id: &RelationalId) -> Result<bool, StoreError> {
            self.inner.delete_by_id(id).await
        }
    }

    type Writer<'a> = BatchWriter<'a, RelationalId, u32>;

    async fn persisted(store: &ChunkRecorder) -> Vec<u32> {
        let mut values: Vec<u32> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.data)
            .collect();
        values.sort_unstable();
        values
    }

    #[tokio::test]
    async fn test_flush_count_is_ceiling_of_n_over_k() {
        for (n, k) in [(0u32, 3usize), (1, 3), (3, 3), (10, 3), (10, 1), (7, 100)] {
            let store = ChunkRecorder::new(None);
            let metrics = Writer::write_all(&store, k, 0..n).await.unwrap();

            let expected = (n as usize).div_ceil(k);
            let chunks = store.chunks();
            assert_eq!(chunks.len(), expected, "n={n} k={k}");
            assert_eq!(metrics.batch_count, expected as u64);
            assert_eq!(metrics.rows_written, n as u64);
            assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= k));
        }
    }

    #[tokio::test]
    async fn test_every_record_is_flushed_exactly_once() {
        let store = ChunkRecorder::new(None);
        Writer::write_all(&store, 4, 0..23u32).await.unwrap();

        let mut flushed: Vec<u32> = store.chunks().into_iter().flatten().collect();
        flushed.sort_unstable();
        assert_eq!(flushed, (0..23).collect::<Vec<_>>());
        assert_eq!(persisted(&store).await, (0..23).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_finish_on_empty_buffer_is_a_no_op() {
        let store = ChunkRecorder::new(None);
        let mut writer = Writer::new(&store, 5).unwrap();
        for i in 0..5 {
            writer.push(i).await.unwrap();
        }
        assert_eq!(writer.pending(), 0);

        let metrics = writer.finish().await.unwrap();
        assert_eq!(metrics.batch_count, 1);
        assert_eq!(store.chunks().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_chunk_aborts_but_keeps_earlier_chunks() {
        let store = ChunkRecorder::new(Some(2));
        let result = Writer::write_all(&store, 3, 0..20u32).await;

        assert!(matches!(result, Err(GeneratorError::Store(_))));
        // Chunks 0 and 1 were durable before chunk 2 failed; nothing after it ran.
        assert_eq!(store.chunks().len(), 3);
        assert_eq!(persisted(&store).await, vec![0, 1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_rejected() {
        let store = ChunkRecorder::new(None);
        assert!(matches!(
            Writer::new(&store, 0),
            Err(GeneratorError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_metrics() {
        let metrics = BatchMetrics {
            rows_written: 1000,
            batch_count: 10,
            write_duration: Duration::from_secs(10),
        };
        assert_eq!(metrics.rows_per_second(), 100.0);
        assert_eq!(BatchMetrics::default().rows_per_second(), 0.0);
    }
}
