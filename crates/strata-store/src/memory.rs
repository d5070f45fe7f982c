//! Test-only recording store.

use std::future::Future;
use std::pin::Pin;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::record::Record;
use crate::store::{VectorStore, VectorStoreError};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// In-memory [`VectorStore`] that records every flushed batch.
///
/// Used by pipeline tests to assert batching, id assignment, and the
/// drop-on-flush-failure policy.
pub struct MemoryStore {
    batches: RwLock<Vec<Vec<Record>>>,
    ensure_calls: AtomicUsize,
    fail_upserts: bool,
    fail_ensure: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            batches: RwLock::new(Vec::new()),
            ensure_calls: AtomicUsize::new(0),
            fail_upserts: false,
            fail_ensure: false,
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore").finish_non_exhaustive()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every upsert fails; batches are still observable as
    /// dropped on the pipeline side.
    #[must_use]
    pub fn failing_upserts() -> Self {
        Self {
            fail_upserts: true,
            ..Self::default()
        }
    }

    /// A store whose collection provisioning fails.
    #[must_use]
    pub fn failing_ensure() -> Self {
        Self {
            fail_ensure: true,
            ..Self::default()
        }
    }

    /// Every successfully flushed batch, in flush order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn batches(&self) -> Vec<Vec<Record>> {
        self.batches.read().unwrap().clone()
    }

    /// All flushed record ids in flush order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn flushed_ids(&self) -> Vec<u64> {
        self.batches
            .read()
            .unwrap()
            .iter()
            .flatten()
            .map(|r| r.id)
            .collect()
    }

    /// Total number of records across all flushed batches.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.batches.read().unwrap().iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }
}

impl VectorStore for MemoryStore {
    fn ensure_collection(
        &self,
        _collection: &str,
        _vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        Box::pin(async move {
            self.ensure_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_ensure {
                return Err(VectorStoreError::Collection("mock ensure failure".into()));
            }
            Ok(())
        })
    }

    fn upsert(
        &self,
        _collection: &str,
        records: Vec<Record>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>> {
        Box::pin(async move {
            if self.fail_upserts {
                return Err(VectorStoreError::Upsert("mock upsert failure".into()));
            }
            self.batches.write().unwrap().push(records);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordPayload;

    fn record(id: u64) -> Record {
        Record {
            id,
            vector: vec![1.0, 0.0],
            payload: RecordPayload {
                path: "a.md".into(),
                repo: "repo".into(),
                ext: "md".into(),
                title: "a.md".into(),
                language: "markdown".into(),
                path_prefix: String::new(),
                content: "c".into(),
                document: "c".into(),
                raw_content: "c".into(),
            },
        }
    }

    #[tokio::test]
    async fn records_batches_in_order() {
        let store = MemoryStore::new();
        store.upsert("col", vec![record(1), record(2)]).await.unwrap();
        store.upsert("col", vec![record(3)]).await.unwrap();

        assert_eq!(store.batches().len(), 2);
        assert_eq!(store.flushed_ids(), vec![1, 2, 3]);
        assert_eq!(store.total_records(), 3);
    }

    #[tokio::test]
    async fn failing_upserts_record_nothing() {
        let store = MemoryStore::failing_upserts();
        assert!(store.upsert("col", vec![record(1)]).await.is_err());
        assert_eq!(store.total_records(), 0);
    }

    #[tokio::test]
    async fn ensure_counts_calls() {
        let store = MemoryStore::new();
        store.ensure_collection("col", 8).await.unwrap();
        store.ensure_collection("col", 8).await.unwrap();
        assert_eq!(store.ensure_calls(), 2);
    }

    #[tokio::test]
    async fn failing_ensure_errors() {
        let store = MemoryStore::failing_ensure();
        assert!(store.ensure_collection("col", 8).await.is_err());
    }
}
