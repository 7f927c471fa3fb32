//! Configuration file loading and persistence.

use crate::errors::Error;
use std::path::{Path, PathBuf};

use super::{Config, Workspace};

/// Reads and writes the JSON configuration file.
///
/// Saving replaces the whole file; there is no partial update and the last
/// writer wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Config store at the workspace's standard location.
    pub fn for_workspace(workspace: &Workspace) -> Self {
        Self::new(workspace.config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load and validate the configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotInitialized` if the file does not exist.
    pub fn load(&self) -> Result<Config, Error> {
        if !self.path.exists() {
            return Err(Error::NotInitialized(self.path.clone()));
        }

        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file {}: {e}",
                self.path.display()
            ))
        })?;

        let config: Config = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config file {}: {e}",
                self.path.display()
            ))
        })?;

        config.validate()?;
        tracing::debug!(path = %self.path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Atomically overwrite the configuration file.
    ///
    /// The document is written to a sibling `.tmp` file and renamed over the
    /// target, so readers see either the old or the new file, never a torn one.
    pub fn save(&self, config: &Config) -> Result<(), Error> {
        config.validate()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!(
                        "Failed to create config directory {}: {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let mut json = serde_json::to_string_pretty(config)?;
        json.push('\n');

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> (Workspace, ConfigStore) {
        let ws = Workspace::new(dir.path());
        let store = ConfigStore::for_workspace(&ws);
        (ws, store)
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let (_, store) = store_in(&dir);

        assert!(!store.exists());
        assert!(matches!(store.load(), Err(Error::NotInitialized(_))));
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let (ws, store) = store_in(&dir);
        let mut config = Config::default_for(&ws);
        config.enable_cloud("https://abc.supabase.co", "anon").unwrap();
        config.auto_curation.frequency = "weekly".to_string();

        store.save(&config).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, config);
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn test_save_overwrites_whole_file() {
        let dir = TempDir::new().unwrap();
        let (ws, store) = store_in(&dir);
        let mut config = Config::default_for(&ws);
        config.enable_cloud("https://abc.supabase.co", "anon").unwrap();
        store.save(&config).unwrap();

        let fresh = Config::default_for(&ws);
        store.save(&fresh).unwrap();

        assert_eq!(store.load().unwrap(), fresh);
    }

    #[test]
    fn test_malformed_json() {
        let dir = TempDir::new().unwrap();
        let (_, store) = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let (_, store) = store_in(&dir);
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(
            store.path(),
            r#"{
                "storage": {"local": {"path": "/data/store"}},
                "embeddings": {"model": "sentence-transformers/all-MiniLM-L6-v2"}
            }"#,
        )
        .unwrap();

        let config = store.load().unwrap();
        assert!(config.storage.local.enabled);
        assert_eq!(config.storage.cloud.provider, "supabase");
        assert!(config.embeddings.local);
        assert!(config.auto_capture.daily_logs);
        assert_eq!(config.auto_curation.frequency, "daily");
    }

    #[test]
    fn test_save_rejects_invalid_config() {
        let dir = TempDir::new().unwrap();
        let (ws, store) = store_in(&dir);
        let mut config = Config::default_for(&ws);
        config.embeddings.model = String::new();

        assert!(matches!(store.save(&config), Err(Error::Config(_))));
        assert!(!store.exists());
    }
}
