use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_KEYWORD_MUST: f32 = 0.45;
pub const DEFAULT_KEYWORD_NICE: f32 = 0.15;
pub const DEFAULT_EMBEDDINGS: f32 = 0.40;

/// Outer blend weights. Not normalized and not validated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightSet {
    #[serde(default = "default_keyword_must")]
    pub keyword_must: f32,

    #[serde(default = "default_keyword_nice")]
    pub keyword_nice: f32,

    /// Weight of the blended semantic signal (embeddings + TF-IDF)
    #[serde(default = "default_embeddings")]
    pub embeddings: f32,
}

impl Default for WeightSet {
    fn default() -> Self {
        Self {
            keyword_must: DEFAULT_KEYWORD_MUST,
            keyword_nice: DEFAULT_KEYWORD_NICE,
            embeddings: DEFAULT_EMBEDDINGS,
        }
    }
}

impl WeightSet {
    /// Build from a loose name -> value map. Missing names take the defaults,
    /// unknown names are ignored.
    pub fn from_map(map: &HashMap<String, f32>) -> Self {
        let defaults = Self::default();
        Self {
            keyword_must: map.get("keyword_must").copied().unwrap_or(defaults.keyword_must),
            keyword_nice: map.get("keyword_nice").copied().unwrap_or(defaults.keyword_nice),
            embeddings: map.get("embeddings").copied().unwrap_or(defaults.embeddings),
        }
    }

    /// Apply optional per-field overrides.
    pub fn with_overrides(
        self,
        keyword_must: Option<f32>,
        keyword_nice: Option<f32>,
        embeddings: Option<f32>,
    ) -> Self {
        Self {
            keyword_must: keyword_must.unwrap_or(self.keyword_must),
            keyword_nice: keyword_nice.unwrap_or(self.keyword_nice),
            embeddings: embeddings.unwrap_or(self.embeddings),
        }
    }
}

fn default_keyword_must() -> f32 {
    DEFAULT_KEYWORD_MUST
}

fn default_keyword_nice() -> f32 {
    DEFAULT_KEYWORD_NICE
}

fn default_embeddings() -> f32 {
    DEFAULT_EMBEDDINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let weights: WeightSet = serde_yml::from_str("keyword_must: 0.7").unwrap();
        assert_eq!(weights.keyword_must, 0.7);
        assert_eq!(weights.keyword_nice, DEFAULT_KEYWORD_NICE);
        assert_eq!(weights.embeddings, DEFAULT_EMBEDDINGS);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let weights: WeightSet = serde_yml::from_str("bogus: 3.0\nembeddings: 0.2").unwrap();
        assert_eq!(weights.embeddings, 0.2);
        assert_eq!(weights.keyword_must, DEFAULT_KEYWORD_MUST);
    }

    #[test]
    fn test_from_map() {
        let mut map = HashMap::new();
        map.insert("keyword_nice".to_string(), 0.3);
        map.insert("unrelated".to_string(), 9.0);

        let weights = WeightSet::from_map(&map);
        assert_eq!(weights.keyword_nice, 0.3);
        assert_eq!(weights.keyword_must, DEFAULT_KEYWORD_MUST);
        assert_eq!(weights.embeddings, DEFAULT_EMBEDDINGS);
    }

    #[test]
    fn test_overrides() {
        let weights = WeightSet::default().with_overrides(None, Some(0.0), Some(1.0));
        assert_eq!(weights.keyword_must, DEFAULT_KEYWORD_MUST);
        assert_eq!(weights.keyword_nice, 0.0);
        assert_eq!(weights.embeddings, 1.0);
    }
}
