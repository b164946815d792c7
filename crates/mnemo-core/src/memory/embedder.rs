//! Embedder trait for text-to-vector conversion.
//!
//! Defines the interface for embedding text into vectors for semantic search.
//! Implementations (e.g., the local fastembed model) live in mnemo-infra.

use mnemo_types::error::EmbedError;

/// Trait for converting text into embedding vectors.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations must be safe to share across tasks; callers add no
/// synchronization around `embed`.
pub trait Embedder: Send + Sync {
    /// Embed one or more texts into vectors.
    ///
    /// Returns one vector per input text, in input order.
    fn embed(
        &self,
        texts: &[String],
    ) -> impl std::future::Future<Output = Result<Vec<Vec<f32>>, EmbedError>> + Send;

    /// The model name used for embeddings (e.g., "all-MiniLM-L6-v2").
    fn model_name(&self) -> &str;

    /// The dimensionality of the output vectors.
    ///
    /// Callers must query this rather than assume a size.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    fn embed_one(
        &self,
        text: &str,
    ) -> impl std::future::Future<Output = Result<Vec<f32>, EmbedError>> + Send {
        let texts = vec![text.to_string()];
        async move {
            let mut vectors = self.embed(&texts).await?;
            match vectors.pop() {
                Some(vector) if vectors.is_empty() => Ok(vector),
                _ => Err(EmbedError::CountMismatch {
                    expected: 1,
                    actual: vectors.len() + 1,
                }),
            }
        }
    }
}
