//! Embedding service used by the score composer.
//!
//! - Lazy-loads the embedding model on first use, exactly once
//! - Memoizes embeddings per text (keyed by SHA-256 of the text), up to
//!   `MAX_CACHED_EMBEDDINGS` entries
//! - Short-circuits blank texts to a zero vector without touching the model

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::config::EmbeddingConfig;
use crate::scoring::embeddings::{EmbeddingBackend, EmbeddingError, EmbeddingModel};

/// Memo cache size at which it is emptied before the next insert.
const MAX_CACHED_EMBEDDINGS: usize = 4096;

/// Production embedding backend.
///
/// Thread-safe through interior mutability. After the model is loaded the
/// only mutation is the memo cache. It lives as long as the service and is
/// emptied whenever it would grow past `MAX_CACHED_EMBEDDINGS`.
pub struct EmbeddingService {
    config: EmbeddingConfig,
    cache_dir: PathBuf,
    /// Uses Mutex<Option<_>> instead of OnceLock because get_or_try_init is unstable.
    model: Mutex<Option<EmbeddingModel>>,
    cache: Mutex<HashMap<[u8; 32], Vec<f32>>>,
}

impl EmbeddingService {
    /// Create the service in an unloaded state.
    ///
    /// # Arguments
    /// * `config` - Embedding configuration (model name, timeouts, batch size)
    /// * `cache_dir` - Base directory; models are stored under `models/`
    pub fn new(config: EmbeddingConfig, cache_dir: PathBuf) -> Self {
        Self {
            config,
            cache_dir,
            model: Mutex::new(None),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.model
            .lock()
            .ok()
            .map(|guard| guard.is_some())
            .unwrap_or(false)
    }

    /// Number of memoized embeddings.
    pub fn cached_count(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Drop every memoized embedding. The model stays loaded.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// Eagerly load the model. Normally this happens on first use.
    pub fn initialize(&self) -> Result<(), EmbeddingError> {
        if !self.config.enabled {
            return Err(EmbeddingError::Disabled);
        }
        self.with_model(|_| Ok(()))
    }

    fn with_model<R>(
        &self,
        f: impl FnOnce(&EmbeddingModel) -> Result<R, EmbeddingError>,
    ) -> Result<R, EmbeddingError> {
        let mut guard = self
            .model
            .lock()
            .map_err(|e| EmbeddingError::InitFailed(format!("Lock poisoned: {}", e)))?;

        if guard.is_none() {
            *guard = Some(self.load()?);
        }

        match guard.as_ref() {
            Some(model) => f(model),
            None => Err(EmbeddingError::InitFailed("model not loaded".to_string())),
        }
    }

    fn load(&self) -> Result<EmbeddingModel, EmbeddingError> {
        log::info!("Loading embedding model '{}'", self.config.model);

        let model = EmbeddingModel::load(&self.config, &self.cache_dir)?;

        log::info!(
            "Embedding model '{}' ready ({} dims)",
            model.name(),
            model.dimensions()?
        );
        Ok(model)
    }
}

impl EmbeddingBackend for EmbeddingService {
    /// Blank texts yield an empty vector, which scores 0.0 against anything.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if !self.config.enabled {
            return Err(EmbeddingError::Disabled);
        }

        let keys: Vec<[u8; 32]> = texts.iter().map(|t| text_key(t)).collect();
        let mut out: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

        // collect cache misses, one entry per distinct text
        let mut pending: Vec<(usize, [u8; 32])> = Vec::new();
        {
            let cache = self
                .cache
                .lock()
                .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Lock poisoned: {}", e)))?;

            for (i, text) in texts.iter().enumerate() {
                if text.trim().is_empty() {
                    out[i] = Some(Vec::new());
                } else if let Some(hit) = cache.get(&keys[i]) {
                    out[i] = Some(hit.clone());
                } else if !pending.iter().any(|(_, k)| *k == keys[i]) {
                    pending.push((i, keys[i]));
                }
            }
        }

        if !pending.is_empty() {
            let batch: Vec<String> = pending.iter().map(|(i, _)| texts[*i].clone()).collect();
            log::debug!("embedding {} new texts ({} cached)", batch.len(), texts.len() - batch.len());

            let fresh = self.with_model(|model| model.embed_batch(&batch))?;
            let fresh: HashMap<[u8; 32], Vec<f32>> =
                pending.into_iter().map(|(_, key)| key).zip(fresh).collect();

            for (i, slot) in out.iter_mut().enumerate() {
                if slot.is_none() {
                    *slot = fresh.get(&keys[i]).cloned();
                }
            }

            let mut cache = self
                .cache
                .lock()
                .map_err(|e| EmbeddingError::EmbeddingFailed(format!("Lock poisoned: {}", e)))?;
            for (key, vector) in fresh {
                remember(&mut cache, key, vector, MAX_CACHED_EMBEDDINGS);
            }
        }

        out.into_iter()
            .map(|v| v.ok_or_else(|| EmbeddingError::EmbeddingFailed("missing embedding".to_string())))
            .collect()
    }

    fn dimensions(&self) -> Result<usize, EmbeddingError> {
        if !self.config.enabled {
            return Err(EmbeddingError::Disabled);
        }
        self.with_model(|model| model.dimensions())
    }
}

/// Insert into the memo cache, emptying it first when full.
fn remember(cache: &mut HashMap<[u8; 32], Vec<f32>>, key: [u8; 32], vector: Vec<f32>, cap: usize) {
    if cache.len() >= cap && !cache.contains_key(&key) {
        log::debug!("embedding cache full ({} entries), clearing", cache.len());
        cache.clear();
    }
    cache.insert(key, vector);
}

fn text_key(text: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(enabled: bool) -> EmbeddingConfig {
        EmbeddingConfig {
            enabled,
            ..EmbeddingConfig::default()
        }
    }

    #[test]
    fn test_disabled_service_returns_error() {
        let service = EmbeddingService::new(test_config(false), PathBuf::from("/tmp"));

        let result = service.embed_batch(&["python".to_string()]);
        assert!(matches!(result, Err(EmbeddingError::Disabled)));
        assert!(matches!(service.initialize(), Err(EmbeddingError::Disabled)));
    }

    #[test]
    fn test_not_initialized_initially() {
        let service = EmbeddingService::new(test_config(true), PathBuf::from("/tmp"));
        assert!(!service.is_initialized());
        assert_eq!(service.cached_count(), 0);
    }

    #[test]
    fn test_blank_texts_do_not_load_model() {
        let service = EmbeddingService::new(test_config(true), PathBuf::from("/tmp"));

        let vectors = service
            .embed_batch(&["".to_string(), "   \n".to_string()])
            .unwrap();
        assert_eq!(vectors, vec![Vec::<f32>::new(), Vec::new()]);
        assert!(!service.is_initialized());
    }

    #[test]
    fn test_text_key_is_stable() {
        assert_eq!(text_key("resume"), text_key("resume"));
        assert_ne!(text_key("resume"), text_key("Resume"));
    }

    #[test]
    fn test_cache_is_capped() {
        let mut cache = HashMap::new();
        for text in ["a", "b", "c"] {
            remember(&mut cache, text_key(text), vec![1.0], 3);
        }
        assert_eq!(cache.len(), 3);

        // refreshing a known key never evicts
        remember(&mut cache, text_key("b"), vec![2.0], 3);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache[&text_key("b")], vec![2.0]);

        remember(&mut cache, text_key("d"), vec![3.0], 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains_key(&text_key("d")));
    }

    #[test]
    #[ignore = "requires model download"]
    fn test_embeddings_are_memoized() {
        let dir = tempfile::tempdir().unwrap();
        let service = EmbeddingService::new(test_config(true), dir.path().to_path_buf());

        let texts = vec![
            "Python developer".to_string(),
            "Python developer".to_string(),
            "Pastry chef".to_string(),
        ];
        let first = service.embed_batch(&texts).unwrap();
        assert_eq!(service.cached_count(), 2);
        assert_eq!(first[0], first[1]);

        let second = service.embed_batch(&texts[..1]).unwrap();
        assert_eq!(second[0], first[0]);
        assert!(service.is_initialized());

        service.clear_cache();
        assert_eq!(service.cached_count(), 0);
    }
}
