use crate::error::EmbedError;

/// A model capable of embedding batches of text.
///
/// Implementations must be safe to call concurrently from multiple worker
/// tasks; the pipeline shares a single instance across its pool.
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input in the same
    /// order. Vectors have a fixed per-model length.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying model fails; the batch is never
    /// partially embedded.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send;

    /// Model identifier, used as the named-vector key in the store.
    fn model_id(&self) -> &str;

    /// Vector length this model produces.
    fn dimension(&self) -> usize;
}
