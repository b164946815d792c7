//! FastEmbed-based local embedding generator.
//!
//! Implements the `Embedder` trait from `mnemo-core` using fastembed's
//! all-MiniLM-L6-v2 model with ONNX runtime inference. Loading the model
//! reads (and on first run downloads) its weights, so the process keeps one
//! shared instance behind [`embedding_model`].

use std::path::PathBuf;
use std::sync::{Arc, LazyLock, Mutex};

use fastembed::{EmbeddingModel, TextEmbedding, TextInitOptions};

use mnemo_core::memory::cell::EmbedderCell;
use mnemo_core::memory::embedder::Embedder;
use mnemo_types::error::{EmbedError, ModelLoadError};

use crate::filesystem::{model_cache_dir, resolve_data_dir};

/// Name of the sentence-embedding model every memory vector is built with.
pub const EMBEDDING_MODEL_NAME: &str = "all-MiniLM-L6-v2";

static EMBEDDINGS: LazyLock<EmbedderCell<FastEmbedder>> = LazyLock::new(EmbedderCell::new);

/// The process-wide embedding model.
///
/// The first call loads the model on a blocking thread; every later call
/// returns the same `Arc`. Concurrent first calls share a single load. A
/// failed load is not cached, so the next call tries again.
pub async fn embedding_model() -> Result<Arc<FastEmbedder>, ModelLoadError> {
    EMBEDDINGS
        .get_or_try_init(|| async {
            let cache_dir = model_cache_dir(&resolve_data_dir());
            tokio::task::spawn_blocking(move || FastEmbedder::load(cache_dir))
                .await
                .map_err(|e| model_load_error(format!("model loader task failed: {e}")))?
        })
        .await
}

/// Local embedding model backed by fastembed.
///
/// fastembed needs exclusive access to the ONNX session while embedding, so
/// the model sits behind a mutex and inference runs on a blocking thread.
pub struct FastEmbedder {
    model: Arc<Mutex<TextEmbedding>>,
    dimension: usize,
}

impl FastEmbedder {
    /// Load the model, caching weights under `cache_dir`.
    ///
    /// Blocking: call from `spawn_blocking` or a plain thread.
    pub fn load(cache_dir: PathBuf) -> Result<Self, ModelLoadError> {
        let dimension = TextEmbedding::get_model_info(&EmbeddingModel::AllMiniLML6V2)
            .map(|info| info.dim)
            .map_err(|e| model_load_error(e.to_string()))?;

        tracing::info!(
            model = EMBEDDING_MODEL_NAME,
            cache_dir = %cache_dir.display(),
            "Loading embedding model"
        );

        let options = TextInitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);
        let model = TextEmbedding::try_new(options).map_err(|e| model_load_error(e.to_string()))?;

        Ok(Self {
            model: Arc::new(Mutex::new(model)),
            dimension,
        })
    }
}

impl Embedder for FastEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let model = Arc::clone(&self.model);
        let batch = texts.to_vec();
        let expected = batch.len();

        let vectors = tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|_| EmbedError::Inference("embedding model lock poisoned".to_string()))?;
            model
                .embed(batch, None)
                .map_err(|e| EmbedError::Inference(e.to_string()))
        })
        .await
        .map_err(|e| EmbedError::Inference(format!("embedding task failed: {e}")))??;

        if vectors.len() != expected {
            return Err(EmbedError::CountMismatch {
                expected,
                actual: vectors.len(),
            });
        }
        Ok(vectors)
    }

    fn model_name(&self) -> &str {
        EMBEDDING_MODEL_NAME
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

fn model_load_error(reason: String) -> ModelLoadError {
    ModelLoadError {
        model: EMBEDDING_MODEL_NAME.to_string(),
        reason,
    }
}
