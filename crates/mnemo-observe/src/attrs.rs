//! Span naming for memory-layer operations.
//!
//! Operation spans are named `mnemo.operation` and carry these fields:
//!
//! - `mnemo.operation.name`: one of the `OP_*` values below
//! - `mnemo.index.name`: target vector index (index operations only)
//! - `mnemo.index.namespace`: target namespace (index operations only)
//! - `mnemo.embedding.model`: embedding model (embedding operations only)
//!
//! Field names are written literally in `tracing::info_span!` calls; the
//! values are shared here so exporters see one spelling.

// --- Operation name values ---

/// Request configuration resolution.
pub const OP_RESOLVE_CONFIG: &str = "ensure_configurable";

/// Text embedding.
pub const OP_EMBED: &str = "embed";

/// Vector upsert into the index.
pub const OP_UPSERT: &str = "upsert";

/// Nearest-neighbour query against the index.
pub const OP_QUERY: &str = "query";

// --- Provider name values ---

/// Pinecone vector index service.
pub const PROVIDER_PINECONE: &str = "pinecone";

/// Local fastembed embedding runtime.
pub const PROVIDER_FASTEMBED: &str = "fastembed";
