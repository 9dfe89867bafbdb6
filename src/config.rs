use std::path::{Path, PathBuf};

use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::scoring::lexical::DEFAULT_MAX_FEATURES;
use crate::scoring::WeightSet;
use crate::storage::{BackendLocal, StorageManager};

const CONFIG_FILE: &str = "config.yaml";

/// Default embedding model (small, fast, decent quality)
const DEFAULT_EMBEDDING_MODEL: &str = "all-MiniLM-L6-v2";
/// Default model download timeout in seconds
const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const DEFAULT_PROFILES_DIR: &str = "role_profiles";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("config file is not valid utf8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("invalid config value {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("could not determine home directory")]
    NoHome,
}

/// Configuration for the embedding backend
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Disable to score with keywords and TF-IDF only
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2")
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Timeout for model download in seconds
    #[serde(default = "default_download_timeout_secs")]
    pub download_timeout_secs: u64,

    /// Inference batch size passed to the model; library default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Score lexical-only with a warning instead of failing when the model
    /// cannot be loaded
    #[serde(default)]
    pub lexical_fallback: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            batch_size: None,
            lexical_fallback: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LexicalConfig {
    /// Vocabulary cap for the TF-IDF scorer
    #[serde(default = "default_max_features")]
    pub max_features: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_download_timeout_secs() -> u64 {
    DEFAULT_DOWNLOAD_TIMEOUT_SECS
}

fn default_max_features() -> usize {
    DEFAULT_MAX_FEATURES
}

fn default_profiles_dir() -> String {
    DEFAULT_PROFILES_DIR.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub weights: WeightSet,

    #[serde(default)]
    pub embeddings: EmbeddingConfig,

    #[serde(default)]
    pub lexical: LexicalConfig,

    /// Directory of `<role>.yml` profiles, relative to the base path unless absolute
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: String,

    /// Optional YAML file replacing the built-in advice and role tables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advice_file: Option<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            weights: WeightSet::default(),
            embeddings: EmbeddingConfig::default(),
            lexical: LexicalConfig::default(),
            profiles_dir: default_profiles_dir(),
            advice_file: None,
            base_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// Base directory: `RR_BASE_PATH`, or `~/.local/share/rr`.
    pub fn base_path_from_env() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("RR_BASE_PATH") {
            return Ok(PathBuf::from(path));
        }

        let home = my_home()
            .map_err(|_| ConfigError::NoHome)?
            .ok_or(ConfigError::NoHome)?;
        Ok(home.join(".local/share/rr"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(Self::base_path_from_env()?)
    }

    pub fn load_with(base_path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let store = BackendLocal::new(base_path.as_ref())?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            log::info!("Creating default config at {}", base_path.as_ref().display());
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.as_ref().to_path_buf();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = BackendLocal::new(&self.base_path)?;
        store.write(CONFIG_FILE, serde_yml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn profiles_path(&self) -> PathBuf {
        self.resolve(&self.profiles_dir)
    }

    pub fn advice_path(&self) -> Option<PathBuf> {
        self.advice_file.as_deref().map(|p| self.resolve(p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.weights;
        for (field, value) in [
            ("weights.keyword_must", w.keyword_must),
            ("weights.keyword_nice", w.keyword_nice),
            ("weights.embeddings", w.embeddings),
        ] {
            if !value.is_finite() {
                return Err(invalid(field, format!("must be a finite number, got {value}")));
            }
        }

        if self.embeddings.download_timeout_secs == 0 {
            return Err(invalid(
                "embeddings.download_timeout_secs",
                "must be greater than 0".to_string(),
            ));
        }

        if self.embeddings.batch_size == Some(0) {
            return Err(invalid("embeddings.batch_size", "must be greater than 0".to_string()));
        }

        if self.lexical.max_features == 0 {
            return Err(invalid("lexical.max_features", "must be greater than 0".to_string()));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: String) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        message,
    }
}
