//! Error types for strata-index.

use std::num::TryFromIntError;

/// Errors that can abort an indexing run.
///
/// Only provisioning, scanning, and pattern-compilation failures surface to
/// the caller; per-file and per-batch failures are absorbed by the pipeline
/// and reflected in the run report instead.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Work root cannot be enumerated.
    #[error("scan failed: {0}")]
    Scan(String),

    /// Target collection cannot be created or verified.
    #[error("provisioning failed: {0}")]
    Provision(#[from] strata_store::VectorStoreError),

    /// Include/exclude glob pattern did not compile.
    #[error("invalid glob pattern: {0}")]
    Glob(String),

    /// Tokenizer failed to encode or decode.
    #[error("tokenizer error: {0}")]
    Tokenize(String),

    /// Integer conversion error.
    #[error("integer conversion failed: {0}")]
    IntConversion(#[from] TryFromIntError),
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
