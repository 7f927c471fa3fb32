//! Configuration validation logic.

use crate::errors::Error;
use std::path::Path;

use super::{CURATION_FREQUENCIES, CloudStorageConfig};

/// Validates configuration values.
pub struct ConfigValidator<'a> {
    /// HuggingFace embedding model identifier.
    pub embedding_model: &'a str,
    /// Local vector store directory.
    pub store_path: &'a Path,
    /// Whether local storage is switched on.
    pub local_enabled: bool,
    /// Cloud section (credentials are only checked when enabled).
    pub cloud: &'a CloudStorageConfig,
    /// Auto-curation frequency keyword.
    pub curation_frequency: &'a str,
}

impl ConfigValidator<'_> {
    /// Validate all configuration values for correctness and constraints.
    ///
    /// Checks that:
    /// - Embedding model is not empty
    /// - Local storage is enabled and its path is not empty
    /// - Enabled cloud storage has a URL and an API key
    /// - Curation frequency is a known keyword
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if any validation check fails.
    pub fn validate(&self) -> Result<(), Error> {
        self.validate_embedding_model()?;
        self.validate_local_storage()?;
        self.validate_cloud()?;
        self.validate_curation_frequency()?;

        Ok(())
    }

    fn validate_embedding_model(&self) -> Result<(), Error> {
        if self.embedding_model.trim().is_empty() {
            return Err(Error::Config("Embedding model cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_local_storage(&self) -> Result<(), Error> {
        if !self.local_enabled {
            return Err(Error::Config(
                "storage.local.enabled must be true: local storage is the only vector store"
                    .to_string(),
            ));
        }

        if self.store_path.as_os_str().is_empty() {
            return Err(Error::Config("storage.local.path cannot be empty".to_string()));
        }

        Ok(())
    }

    fn validate_cloud(&self) -> Result<(), Error> {
        if !self.cloud.enabled {
            return Ok(());
        }

        if self.cloud.url.trim().is_empty() || self.cloud.api_key.trim().is_empty() {
            return Err(Error::Config(
                "Cloud storage is enabled but storage.cloud.url or storage.cloud.api_key is empty"
                    .to_string(),
            ));
        }

        Ok(())
    }

    fn validate_curation_frequency(&self) -> Result<(), Error> {
        if !CURATION_FREQUENCIES.contains(&self.curation_frequency) {
            return Err(Error::Config(format!(
                "Invalid auto_curation.frequency: '{}' (expected one of {})",
                self.curation_frequency,
                CURATION_FREQUENCIES.join(", ")
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator<'a>(cloud: &'a CloudStorageConfig) -> ConfigValidator<'a> {
        ConfigValidator {
            embedding_model: "test/model",
            store_path: Path::new("/test/store"),
            local_enabled: true,
            cloud,
            curation_frequency: "daily",
        }
    }

    #[test]
    fn test_valid_defaults() {
        let cloud = CloudStorageConfig::default();
        assert!(validator(&cloud).validate().is_ok());
    }

    #[test]
    fn test_empty_model_rejected() {
        let cloud = CloudStorageConfig::default();
        let mut v = validator(&cloud);
        v.embedding_model = "  ";

        assert!(matches!(v.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_disabled_local_storage_rejected() {
        let cloud = CloudStorageConfig::default();
        let mut v = validator(&cloud);
        v.local_enabled = false;

        assert!(matches!(v.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_empty_store_path_rejected() {
        let cloud = CloudStorageConfig::default();
        let mut v = validator(&cloud);
        v.store_path = Path::new("");

        assert!(matches!(v.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_enabled_cloud_without_key_rejected() {
        let cloud = CloudStorageConfig {
            enabled: true,
            url: "https://example.supabase.co".to_string(),
            ..Default::default()
        };

        assert!(matches!(validator(&cloud).validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_disabled_cloud_without_credentials_ok() {
        let cloud = CloudStorageConfig {
            enabled: false,
            url: String::new(),
            ..Default::default()
        };

        assert!(validator(&cloud).validate().is_ok());
    }

    #[test]
    fn test_curation_frequency_bounds() {
        let cloud = CloudStorageConfig::default();
        let mut v = validator(&cloud);
        for frequency in CURATION_FREQUENCIES {
            v.curation_frequency = frequency;
            assert!(v.validate().is_ok());
        }

        v.curation_frequency = "fortnightly";
        assert!(matches!(v.validate(), Err(Error::Config(_))));
    }
}
