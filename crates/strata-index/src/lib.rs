//! File discovery, chunking, and indexing orchestration for strata.
//!
//! The pipeline walks a work root, splits matching files into token-bounded
//! chunks, embeds them through a shared provider, and delivers batched,
//! id-assigned records to the vector store. Strategy is size-adaptive: small
//! trees get one parallel pass, large trees are processed in fixed-size file
//! groups to bound peak memory.

pub mod chunker;
pub mod config;
pub mod error;
pub mod filter;
pub(crate) mod languages;
pub mod pipeline;
pub mod processor;

pub use config::PipelineConfig;
pub use error::{IndexError, Result};
pub use pipeline::{IndexPipeline, IndexReport};
