use crate::config::{Config, ConfigError};
use crate::scoring::WeightSet;
use crate::storage::{BackendLocal, StorageManager};

fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Fresh start: no config.yaml → default file written
#[test]
fn test_default_config_created() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();

    let config = Config::load_with(dir.path()).unwrap();

    assert!(store.exists("config.yaml"));
    assert_eq!(config.weights, WeightSet::default());
    assert!(config.embeddings.enabled);
    assert_eq!(config.embeddings.model, "all-MiniLM-L6-v2");
    assert_eq!(config.lexical.max_features, 5000);
    assert_eq!(config.profiles_path(), dir.path().join("role_profiles"));
    assert!(config.advice_path().is_none());

    // second load reads the file back unchanged
    let again = Config::load_with(dir.path()).unwrap();
    assert_eq!(again.weights, config.weights);
}

/// Partial file: missing keys take defaults and the file is upgraded
#[test]
fn test_partial_config_upgraded() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store
        .write(
            "config.yaml",
            b"weights:\n  keyword_must: 0.6\nembeddings:\n  enabled: false\n",
        )
        .unwrap();

    let config = Config::load_with(dir.path()).unwrap();
    assert_eq!(config.weights.keyword_must, 0.6);
    assert_eq!(config.weights.keyword_nice, 0.15);
    assert_eq!(config.weights.embeddings, 0.40);
    assert!(!config.embeddings.enabled);
    assert_eq!(config.embeddings.download_timeout_secs, 300);

    let saved = String::from_utf8(store.read("config.yaml").unwrap()).unwrap();
    assert!(saved.contains("keyword_nice"));
    assert!(saved.contains("max_features"));
}

#[test]
fn test_paths_resolve_against_base() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store
        .write(
            "config.yaml",
            b"profiles_dir: /srv/roles\nadvice_file: advice.yaml\n",
        )
        .unwrap();

    let config = Config::load_with(dir.path()).unwrap();
    assert_eq!(config.profiles_path(), std::path::PathBuf::from("/srv/roles"));
    assert_eq!(config.advice_path(), Some(dir.path().join("advice.yaml")));
}

#[test]
fn test_invalid_values_rejected() {
    for (yaml, field) in [
        ("embeddings:\n  download_timeout_secs: 0\n", "embeddings.download_timeout_secs"),
        ("embeddings:\n  batch_size: 0\n", "embeddings.batch_size"),
        ("lexical:\n  max_features: 0\n", "lexical.max_features"),
    ] {
        let dir = temp_dir();
        let store = BackendLocal::new(dir.path()).unwrap();
        store.write("config.yaml", yaml.as_bytes()).unwrap();

        match Config::load_with(dir.path()) {
            Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected invalid {field}, got {other:?}"),
        }
    }
}

#[test]
fn test_malformed_config() {
    let dir = temp_dir();
    let store = BackendLocal::new(dir.path()).unwrap();
    store.write("config.yaml", b"weights: [1, 2").unwrap();

    assert!(matches!(
        Config::load_with(dir.path()),
        Err(ConfigError::Malformed(_))
    ));
}
