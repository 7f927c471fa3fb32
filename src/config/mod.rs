//! Configuration system for eternal-memory.
//!
//! The configuration is a single JSON document living inside a [`Workspace`].
//! Nothing here reaches for a global location on its own: callers resolve a
//! workspace once and pass it (or paths derived from it) to every component.

mod env_parser;
mod loader;
mod paths;
mod validation;

#[cfg(test)]
pub(crate) mod tests_utils;

use crate::errors::Error;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use loader::ConfigStore;
pub use paths::{Workspace, expand_tilde_path};

/// Default sentence-transformer model (384 dimensions).
pub const DEFAULT_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Accepted values for `auto_curation.frequency`.
pub const CURATION_FREQUENCIES: [&str; 3] = ["hourly", "daily", "weekly"];

/// Persisted settings, one file per workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub embeddings: EmbeddingsConfig,
    #[serde(default)]
    pub auto_capture: AutoCaptureConfig,
    #[serde(default)]
    pub auto_curation: AutoCurationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub local: LocalStorageConfig,
    #[serde(default)]
    pub cloud: CloudStorageConfig,
}

/// Local vector store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalStorageConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Directory holding the store database. Relative paths resolve against
    /// the workspace root.
    pub path: PathBuf,
}

/// Cloud credentials. Persisted only; no sync is performed by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudStorageConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for CloudStorageConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            url: String::new(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// HuggingFace model identifier.
    pub model: String,
    #[serde(default = "default_true")]
    pub local: bool,
    /// Overrides the HuggingFace hub cache directory for model files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCaptureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Append every stored memory to the daily markdown log.
    #[serde(default = "default_true")]
    pub daily_logs: bool,
}

impl Default for AutoCaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            daily_logs: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoCurationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

impl Default for AutoCurationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: default_frequency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "supabase".to_string()
}

fn default_frequency() -> String {
    "daily".to_string()
}

impl Config {
    /// Default configuration for a freshly set-up workspace.
    pub fn default_for(workspace: &Workspace) -> Self {
        Self {
            storage: StorageConfig {
                local: LocalStorageConfig {
                    enabled: true,
                    path: workspace.default_store_path(),
                },
                cloud: CloudStorageConfig::default(),
            },
            embeddings: EmbeddingsConfig {
                model: DEFAULT_MODEL.to_string(),
                local: true,
                cache_dir: None,
            },
            auto_capture: AutoCaptureConfig::default(),
            auto_curation: AutoCurationConfig::default(),
        }
    }

    /// Load the workspace configuration and apply environment overrides.
    ///
    /// Priority: config file < env vars. Overrides only affect this run and
    /// are never written back.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if the workspace has no config file,
    /// or `Error::Config` if it cannot be parsed or fails validation.
    pub fn load(workspace: &Workspace) -> Result<Self, Error> {
        let mut config = ConfigStore::for_workspace(workspace).load()?;
        env_parser::apply_embedding_model_override(&mut config.embeddings.model)?;
        config.validate()?;
        Ok(config)
    }

    /// Absolute directory of the local vector store.
    pub fn store_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.resolve_path(&self.storage.local.path)
    }

    /// Record cloud credentials and enable cloud storage.
    pub fn enable_cloud(&mut self, url: &str, api_key: &str) -> Result<(), Error> {
        let url = url.trim();
        let api_key = api_key.trim();
        if url.is_empty() || api_key.is_empty() {
            return Err(Error::Config(
                "Cloud storage requires both a project URL and an API key".to_string(),
            ));
        }
        self.storage.cloud.enabled = true;
        self.storage.cloud.url = url.to_string();
        self.storage.cloud.api_key = api_key.to_string();
        Ok(())
    }

    /// Disable cloud storage and forget credentials.
    pub fn disable_cloud(&mut self) {
        self.storage.cloud.enabled = false;
        self.storage.cloud.url.clear();
        self.storage.cloud.api_key.clear();
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), Error> {
        let validator = validation::ConfigValidator {
            embedding_model: &self.embeddings.model,
            store_path: &self.storage.local.path,
            local_enabled: self.storage.local.enabled,
            cloud: &self.storage.cloud,
            curation_frequency: &self.auto_curation.frequency,
        };

        validator.validate()
    }
}
