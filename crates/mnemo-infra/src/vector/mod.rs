//! Vector infrastructure for memory embeddings.
//!
//! Provides the process-wide fastembed embedding model and the Pinecone
//! REST client. Wire types for the Pinecone API live in `types`.

pub mod embedder;
pub mod pinecone;
pub mod types;
