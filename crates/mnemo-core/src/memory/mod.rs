//! Embedding and vector index access for long-term memory.
//!
//! Defines the `Embedder` and `VectorIndex` traits that the infrastructure
//! layer implements, and the `EmbedderCell` single-initialization slot used
//! to share one expensive embedding model across the process.

pub mod cell;
pub mod embedder;
pub mod index;
