//! Vector index record types.
//!
//! These mirror the shape every vector index speaks: an id, a vector and a
//! flat metadata object going in; an id, a similarity score and the metadata
//! coming back out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A vector to store in the index, with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    pub id: String,
    pub values: Vec<f32>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl IndexRecord {
    pub fn new(id: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            values,
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// A single nearest-neighbour result from an index query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMatch {
    pub id: String,
    /// Similarity score as reported by the index (higher is closer).
    pub score: f32,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}
