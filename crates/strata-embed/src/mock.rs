//! Test-only mock embedding provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::embedder::Embedder;
use crate::error::EmbedError;

/// Deterministic in-process embedder for tests.
///
/// Vectors are derived from a cheap hash of the input text, so identical
/// texts always embed identically within and across runs.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    pub dimension: usize,
    pub fail: bool,
    calls: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self {
            dimension: 8,
            fail: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockEmbedder {
    #[must_use]
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            ..Self::default()
        }
    }

    /// An embedder whose every call fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of `embed_batch` invocations so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let seed = text
            .bytes()
            .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
        (0..self.dimension)
            .map(|i| {
                let bits = seed.rotate_left(u32::try_from(i % 64).unwrap_or(0)) & 0xff;
                #[allow(clippy::cast_precision_loss)]
                let val = bits as f32 / 255.0;
                val + 0.01
            })
            .collect()
    }
}

impl Embedder for MockEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(EmbedError::Other("mock embed error".into()));
        }
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn model_id(&self) -> &str {
        "mock-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
