//! Embedding provider abstraction for the strata indexing pipeline.
//!
//! A provider turns a batch of text chunks into equal-length float vectors.
//! Collections are declared with dot-product distance, so every vector must
//! be normalized to unit length before it reaches the store; [`normalize`]
//! and [`normalize_all`] implement that step.

pub mod embedder;
pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod models;
pub mod normalize;

pub use embedder::Embedder;
pub use error::EmbedError;
pub use http::HttpEmbedder;
#[cfg(feature = "mock")]
pub use mock::MockEmbedder;
pub use models::{dimension_for, model_suffix, suffixed_collection};
pub use normalize::{normalize, normalize_all};
