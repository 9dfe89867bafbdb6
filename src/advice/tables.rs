//! Advice and role tables.
//!
//! Both tables are data: a YAML document embedded at build time, optionally
//! replaced by a user file named in config. Keys are lower-cased on load.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

const BUILTIN_TABLES: &str = include_str!("tables.yaml");

static DEFAULT_TABLES: Lazy<AdviceTables> = Lazy::new(|| {
    AdviceTables::from_yaml(BUILTIN_TABLES).unwrap_or_else(|e| {
        log::error!("built-in advice tables are malformed: {e}");
        AdviceTables::default()
    })
});

#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("failed to read advice file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("advice tables are malformed: {0}")]
    Malformed(#[from] serde_yml::Error),
}

/// Result of looking a keyword up in the tip table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tip<'a> {
    Canned(&'a str),
    /// No entry; callers render the generic template
    Generic,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdviceTables {
    #[serde(default)]
    tips: BTreeMap<String, String>,
    #[serde(default)]
    roles: BTreeMap<String, Vec<String>>,
}

impl AdviceTables {
    /// The tables compiled into the binary.
    pub fn builtin() -> &'static AdviceTables {
        &DEFAULT_TABLES
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, AdviceError> {
        let raw: Self = serde_yml::from_str(yaml)?;
        Ok(Self {
            tips: raw
                .tips
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
            roles: raw
                .roles
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, AdviceError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| AdviceError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Lower-cased exact lookup.
    pub fn tip(&self, keyword: &str) -> Tip<'_> {
        match self.tips.get(&keyword.to_lowercase()) {
            Some(tip) => Tip::Canned(tip),
            None => Tip::Generic,
        }
    }

    /// Expected keywords for a role, by lower-cased exact name.
    pub fn role_keywords(&self, role: &str) -> Option<&[String]> {
        self.roles.get(&role.to_lowercase()).map(Vec::as_slice)
    }

    pub fn role_names(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }
}
