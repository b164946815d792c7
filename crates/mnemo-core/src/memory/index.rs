//! Vector index trait.
//!
//! Defines the interface to the remote vector index that stores memory
//! embeddings. The namespace is fixed when the handle is built from the
//! process settings; callers never pick it per request.

use mnemo_types::error::IndexError;
use mnemo_types::index::{IndexMatch, IndexRecord};

/// Handle to a vector index bound to one namespace.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
/// Implementations live in mnemo-infra and surface service failures
/// unmodified, with no retry.
pub trait VectorIndex: Send + Sync {
    /// Insert or overwrite records by id. Returns the number upserted.
    fn upsert(
        &self,
        records: &[IndexRecord],
    ) -> impl std::future::Future<Output = Result<u64, IndexError>> + Send;

    /// Return the `top_k` records nearest to `vector`, best first.
    fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<IndexMatch>, IndexError>> + Send;

    /// The namespace every call on this handle targets.
    fn namespace(&self) -> &str;
}
