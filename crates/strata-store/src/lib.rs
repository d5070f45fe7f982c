//! Vector store abstraction and Qdrant backend for the strata pipeline.
//!
//! Collections host a single named vector keyed by the embedding model
//! identifier and are declared with dot-product distance, which requires
//! callers to upsert pre-normalized vectors.

#[cfg(feature = "mock")]
pub mod memory;
pub mod qdrant;
pub mod record;
pub mod store;

#[cfg(feature = "mock")]
pub use memory::MemoryStore;
pub use qdrant::QdrantStore;
pub use record::{Record, RecordPayload};
pub use store::{VectorStore, VectorStoreError};
