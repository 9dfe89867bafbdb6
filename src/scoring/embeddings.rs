//! Dense text embeddings.
//!
//! `EmbeddingBackend` is the seam the score composer depends on. The
//! production implementation is a fastembed model; every vector it returns is
//! scaled to unit length so similarity is a plain dot product.

use std::path::Path;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use fastembed::{InitOptions, TextEmbedding};

use crate::config::EmbeddingConfig;

const MODELS_SUBDIR: &str = "models";

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("could not load embedding model: {0}")]
    InitFailed(String),

    #[error("embedding inference failed: {0}")]
    EmbeddingFailed(String),

    #[error("embedding model download exceeded {0}s")]
    DownloadTimeout(u64),

    #[error("unsupported embedding model '{0}' (try all-MiniLM-L6-v2, bge-small-en-v1.5 or bge-base-en-v1.5, optionally with -q)")]
    InvalidModel(String),

    #[error("embeddings are disabled")]
    Disabled,
}

/// Anything that can turn texts into unit-length vectors.
///
/// Implementations must return one vector per input text, in input order,
/// all of length `dimensions()`.
pub trait EmbeddingBackend: Send + Sync {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn dimensions(&self) -> Result<usize, EmbeddingError>;
}

/// Map a configured model name to a fastembed model.
///
/// Case-insensitive; a `-q` suffix selects the quantized variant.
fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel, EmbeddingError> {
    use fastembed::EmbeddingModel as M;

    let lower = name.trim().to_lowercase();
    let (base, quantized) = match lower.strip_suffix("-q") {
        Some(base) => (base, true),
        None => (lower.as_str(), false),
    };

    match (base, quantized) {
        ("all-minilm-l6-v2", false) => Ok(M::AllMiniLML6V2),
        ("all-minilm-l6-v2", true) => Ok(M::AllMiniLML6V2Q),
        ("bge-small-en-v1.5", false) => Ok(M::BGESmallENV15),
        ("bge-small-en-v1.5", true) => Ok(M::BGESmallENV15Q),
        ("bge-base-en-v1.5", false) => Ok(M::BGEBaseENV15),
        ("bge-base-en-v1.5", true) => Ok(M::BGEBaseENV15Q),
        _ => Err(EmbeddingError::InvalidModel(name.to_string())),
    }
}

/// Run `f` on a worker thread and wait at most `limit` for its result.
///
/// On timeout the worker is left to finish in the background; its result is
/// discarded. Files it was downloading stay in the cache for the next load.
fn with_deadline<T, F>(limit: Duration, f: F) -> Result<T, EmbeddingError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("model-load".to_string())
        .spawn(move || {
            // receiver is gone after a timeout
            let _ = tx.send(f());
        })
        .map_err(|e| EmbeddingError::InitFailed(format!("spawning loader thread: {e}")))?;

    match rx.recv_timeout(limit) {
        Ok(value) => Ok(value),
        Err(mpsc::RecvTimeoutError::Timeout) => Err(EmbeddingError::DownloadTimeout(limit.as_secs())),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(EmbeddingError::InitFailed("loader thread panicked".to_string()))
        }
    }
}

/// A loaded fastembed model.
///
/// fastembed needs `&mut self` to embed, hence the mutex.
pub struct EmbeddingModel {
    inner: Mutex<TextEmbedding>,
    name: String,
    dims: usize,
    batch_size: Option<usize>,
}

impl EmbeddingModel {
    /// Load (downloading on first use) the model named in `config`.
    ///
    /// Weights are cached under `<cache_dir>/models`. Loading is abandoned
    /// once it outlasts `download_timeout_secs`.
    pub fn load(config: &EmbeddingConfig, cache_dir: &Path) -> Result<Self, EmbeddingError> {
        let kind = resolve_model(&config.model)?;
        let limit = Duration::from_secs(config.download_timeout_secs);

        let models_dir = cache_dir.join(MODELS_SUBDIR);
        std::fs::create_dir_all(&models_dir)
            .map_err(|e| EmbeddingError::InitFailed(format!("{}: {}", models_dir.display(), e)))?;

        let mut inner = with_deadline(limit, move || {
            TextEmbedding::try_new(
                InitOptions::new(kind)
                    .with_cache_dir(models_dir)
                    .with_show_download_progress(true),
            )
        })?
        .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        // fastembed does not expose the output width, so embed one token
        let dims = inner
            .embed(vec!["dimension check"], None)
            .map_err(|e| EmbeddingError::InitFailed(e.to_string()))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| EmbeddingError::InitFailed("model produced no vector".to_string()))?;

        Ok(Self {
            inner: Mutex::new(inner),
            name: config.model.clone(),
            dims,
            batch_size: config.batch_size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("empty result".to_string()))
    }
}

impl EmbeddingBackend for EmbeddingModel {
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let mut model = self
            .inner
            .lock()
            .map_err(|e| EmbeddingError::EmbeddingFailed(format!("model lock poisoned: {}", e)))?;

        let mut embeddings = model
            .embed(texts.to_vec(), self.batch_size)
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        embeddings.iter_mut().for_each(|v| normalize(v));
        Ok(embeddings)
    }

    fn dimensions(&self) -> Result<usize, EmbeddingError> {
        Ok(self.dims)
    }
}

/// Backend used when embeddings are turned off in config.
pub struct DisabledBackend;

impl EmbeddingBackend for DisabledBackend {
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }

    fn dimensions(&self) -> Result<usize, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }
}

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Dot product; equals cosine similarity for unit vectors.
/// Mismatched lengths only use the common prefix.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
