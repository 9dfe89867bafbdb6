//! Role profiles: `<profiles_dir>/<role>.yml` files describing a job role.
//!
//! ```yaml
//! description: Build and evaluate predictive models...
//! keywords:
//!   must_have: [python, sql, statistics]
//!   nice_to_have: [aws, docker]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::storage::{BackendLocal, StorageManager};

const PROFILE_EXTENSION: &str = ".yml";

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("role profile '{0}' not found")]
    NotFound(String),

    #[error("invalid role name '{0}'")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("role profile is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("role profile is not valid utf8")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileKeywords {
    #[serde(default)]
    pub must_have: Vec<String>,
    #[serde(default)]
    pub nice_to_have: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleProfile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: ProfileKeywords,
}

impl RoleProfile {
    /// Job text for scoring: the description, a newline, then every keyword
    /// (must-have first) joined by spaces.
    pub fn job_text(&self) -> String {
        let keywords: Vec<&str> = self
            .keywords
            .must_have
            .iter()
            .chain(&self.keywords.nice_to_have)
            .map(String::as_str)
            .collect();
        format!("{}\n{}", self.description, keywords.join(" "))
    }
}

/// Directory of role profile files.
pub struct ProfileStore {
    store: BackendLocal,
}

impl ProfileStore {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, ProfileError> {
        Ok(Self {
            store: BackendLocal::new(dir)?,
        })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.store.base_dir
    }

    /// Role names (file stems), sorted.
    pub fn list_roles(&self) -> Vec<String> {
        let mut roles: Vec<String> = self
            .store
            .list()
            .into_iter()
            .filter_map(|name| name.strip_suffix(PROFILE_EXTENSION).map(str::to_string))
            .filter(|stem| !stem.is_empty() && !stem.starts_with('.'))
            .collect();
        roles.sort();
        roles
    }

    pub fn load(&self, role: &str) -> Result<RoleProfile, ProfileError> {
        if role.is_empty() || role.contains(['/', '\\']) || role.starts_with('.') {
            return Err(ProfileError::InvalidName(role.to_string()));
        }

        let file = format!("{role}{PROFILE_EXTENSION}");
        if !self.store.exists(&file) {
            return Err(ProfileError::NotFound(role.to_string()));
        }

        let yaml = String::from_utf8(self.store.read(&file)?)?;
        Ok(serde_yml::from_str(&yaml)?)
    }

    pub fn save(&self, role: &str, profile: &RoleProfile) -> Result<(), ProfileError> {
        if role.is_empty() || role.contains(['/', '\\']) || role.starts_with('.') {
            return Err(ProfileError::InvalidName(role.to_string()));
        }
        let file = format!("{role}{PROFILE_EXTENSION}");
        self.store.write(&file, serde_yml::to_string(profile)?.as_bytes())?;
        Ok(())
    }
}
