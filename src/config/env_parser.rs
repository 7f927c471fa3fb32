//! Environment variable parsing utilities for configuration.

use crate::errors::Error;
use std::path::PathBuf;

use super::paths;

/// Workspace root override.
pub const WORKSPACE_VAR: &str = "ETERNAL_MEMORY_WORKSPACE";
/// Embedding model override (per run, never persisted).
pub const MODEL_VAR: &str = "ETERNAL_MEMORY_MODEL";

/// Parse environment variable value or return error if empty/whitespace.
fn parse_env_string(name: &str, value: &str) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(value.trim().to_string())
}

/// Parse environment variable as a path, expanding tilde.
fn parse_env_path(name: &str, value: &str) -> Result<PathBuf, Error> {
    if value.trim().is_empty() {
        return Err(Error::Config(format!("{name} cannot be empty")));
    }
    Ok(paths::expand_tilde_path(&PathBuf::from(value)))
}

/// Read the ETERNAL_MEMORY_WORKSPACE override, if set.
pub fn workspace_override() -> Result<Option<PathBuf>, Error> {
    match std::env::var(WORKSPACE_VAR) {
        Ok(val) => Ok(Some(parse_env_path(WORKSPACE_VAR, &val)?)),
        Err(_) => Ok(None),
    }
}

/// Apply ETERNAL_MEMORY_MODEL environment variable override.
pub fn apply_embedding_model_override(embedding_model: &mut String) -> Result<(), Error> {
    if let Ok(val) = std::env::var(MODEL_VAR) {
        *embedding_model = parse_env_string(MODEL_VAR, &val)?;
    }
    Ok(())
}
