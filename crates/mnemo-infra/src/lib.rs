//! Infrastructure layer for Mnemo.
//!
//! Contains implementations of the ports defined in `mnemo-core`: the
//! settings loader (environment + `settings.toml`), the fastembed-backed
//! embedding model, and the Pinecone vector index client.

pub mod filesystem;
pub mod settings;
pub mod vector;
