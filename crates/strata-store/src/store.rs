use std::future::Future;
use std::pin::Pin;

use crate::record::Record;

#[derive(Debug, thiserror::Error)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("collection error: {0}")]
    Collection(String),
    #[error("upsert error: {0}")]
    Upsert(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Narrow interface the indexing pipeline needs from a vector store.
///
/// Dyn-compatible so the orchestrator can run against a recording test
/// double as well as the Qdrant backend.
pub trait VectorStore: Send + Sync {
    /// Ensure the collection exists with the expected vector schema and
    /// filterable-field indexes. Idempotent.
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;

    /// Write a batch of records. Either the whole batch lands or the call
    /// fails; there is no per-record retry.
    fn upsert(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> BoxFuture<'_, Result<(), VectorStoreError>>;
}
