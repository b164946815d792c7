//! Pinecone REST API request and response types.

use serde::{Deserialize, Serialize};

use mnemo_types::index::{IndexMatch, IndexRecord};

/// Response of `GET /indexes/{name}` on the control plane.
#[derive(Debug, Deserialize)]
pub struct DescribeIndexResponse {
    pub name: String,
    /// Data-plane host, usually without a scheme.
    pub host: String,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
pub struct IndexStatus {
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

/// Body of `POST /vectors/upsert`.
#[derive(Debug, Serialize)]
pub struct UpsertRequest<'a> {
    pub vectors: &'a [IndexRecord],
    pub namespace: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: u64,
}

/// Body of `POST /query`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub vector: &'a [f32],
    pub top_k: usize,
    pub namespace: &'a str,
    pub include_metadata: bool,
    pub include_values: bool,
}

#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<IndexMatch>,
}
