//! Qdrant-backed [`VectorStore`] with a tuned collection schema.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, CreateFieldIndexCollectionBuilder, Distance, FieldType,
    HnswConfigDiffBuilder, OptimizersConfigDiffBuilder, PointStruct, UpsertPointsBuilder,
    VectorParamsBuilder, VectorsConfigBuilder, WalConfigDiffBuilder,
};

use crate::record::Record;
use crate::store::{VectorStore, VectorStoreError};

/// Payload fields indexed for pre-filtering at query time.
const KEYWORD_INDEX_FIELDS: [&str; 3] = ["repo", "language", "path_prefix"];

/// HNSW graph connectivity, tuned for 768-dim embeddings.
const HNSW_M: u64 = 40;
/// Build-time search effort.
const HNSW_EF_CONSTRUCT: u64 = 384;
/// Below this point count Qdrant scans exhaustively instead of using HNSW.
const FULL_SCAN_THRESHOLD: u64 = 10_000;
const INDEXING_THRESHOLD: u64 = 10_000;
const WAL_CAPACITY_MB: u64 = 64;

/// Qdrant store writing records under a named vector keyed by the
/// embedding model identifier.
///
/// Collections are declared with dot-product distance: equivalent to
/// cosine for unit-length vectors and measurably faster. All vectors must
/// be normalized before upsert; cosine collections are deliberately not
/// supported so one collection never mixes both conventions.
pub struct QdrantStore {
    client: Qdrant,
    vector_name: String,
}

impl std::fmt::Debug for QdrantStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantStore")
            .field("vector_name", &self.vector_name)
            .finish_non_exhaustive()
    }
}

impl QdrantStore {
    /// Connect to Qdrant at `url`; `vector_name` is the embedding model id
    /// used as the named-vector key.
    ///
    /// # Errors
    ///
    /// Returns an error if the Qdrant client cannot be created.
    pub fn new(url: &str, vector_name: impl Into<String>) -> Result<Self, VectorStoreError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            vector_name: vector_name.into(),
        })
    }

    async fn ensure_collection_impl(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> Result<(), VectorStoreError> {
        let exists = self
            .client
            .collection_exists(collection)
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        if exists {
            tracing::info!(collection, "collection already exists");
            self.create_payload_indexes(collection).await;
            return Ok(());
        }

        tracing::info!(collection, vector_size, "creating collection");

        let mut vectors = VectorsConfigBuilder::default();
        vectors.add_named_vector_params(
            &self.vector_name,
            VectorParamsBuilder::new(vector_size, Distance::Dot)
                .hnsw_config(
                    HnswConfigDiffBuilder::default()
                        .m(HNSW_M)
                        .ef_construct(HNSW_EF_CONSTRUCT)
                        .full_scan_threshold(FULL_SCAN_THRESHOLD),
                )
                .on_disk(true),
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection)
                    .vectors_config(vectors)
                    .optimizers_config(
                        OptimizersConfigDiffBuilder::default()
                            .indexing_threshold(INDEXING_THRESHOLD),
                    )
                    .wal_config(WalConfigDiffBuilder::default().wal_capacity_mb(WAL_CAPACITY_MB)),
            )
            .await
            .map_err(|e| VectorStoreError::Collection(e.to_string()))?;

        self.create_payload_indexes(collection).await;
        Ok(())
    }

    /// Create keyword indexes for pre-filtering. Failures (including
    /// "already exists") are logged and swallowed: the indexes speed up
    /// filtered search but are not required for correctness.
    async fn create_payload_indexes(&self, collection: &str) {
        for field in KEYWORD_INDEX_FIELDS {
            let result = self
                .client
                .create_field_index(CreateFieldIndexCollectionBuilder::new(
                    collection,
                    field,
                    FieldType::Keyword,
                ))
                .await;
            if let Err(e) = result {
                tracing::warn!(collection, field, "payload index not created: {e}");
            }
        }
    }

    async fn upsert_impl(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> Result<(), VectorStoreError> {
        let mut points = Vec::with_capacity(records.len());
        for record in records {
            let payload: HashMap<String, qdrant_client::qdrant::Value> =
                serde_json::to_value(&record.payload)
                    .and_then(serde_json::from_value)
                    .map_err(|e| VectorStoreError::Serialization(e.to_string()))?;

            let vectors = HashMap::from([(self.vector_name.clone(), record.vector)]);
            points.push(PointStruct::new(record.id, vectors, payload));
        }

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points))
            .await
            .map_err(|e| VectorStoreError::Upsert(e.to_string()))?;
        Ok(())
    }
}

impl VectorStore for QdrantStore {
    fn ensure_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> std::pin::Pin<
        Box<dyn Future<Output = Result<(), VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move { self.ensure_collection_impl(&collection, vector_size).await })
    }

    fn upsert(
        &self,
        collection: &str,
        records: Vec<Record>,
    ) -> std::pin::Pin<
        Box<dyn Future<Output = Result<(), VectorStoreError>> + Send + '_>,
    > {
        let collection = collection.to_owned();
        Box::pin(async move { self.upsert_impl(&collection, records).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_valid_url() {
        let store = QdrantStore::new("http://localhost:6334", "model");
        assert!(store.is_ok());
    }

    #[test]
    fn new_invalid_url() {
        let store = QdrantStore::new("not a valid url", "model");
        assert!(store.is_err());
    }

    #[test]
    fn debug_format_names_vector() {
        let store = QdrantStore::new("http://localhost:6334", "bge-small").unwrap();
        let dbg = format!("{store:?}");
        assert!(dbg.contains("bge-small"));
    }
}
