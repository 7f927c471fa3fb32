//! Workspace layout and tilde (`~`) expansion.

use std::path::{Path, PathBuf};

use crate::errors::Error;

use super::env_parser;

/// Root directory holding configuration, vector store and daily logs.
///
/// Layout:
///
/// ```text
/// <root>/.eternal-memory/config.json
/// <root>/.eternal-memory/store/memories.db
/// <root>/memory/YYYY-MM-DD.md
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Workspace rooted at `root` (tilde expanded).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: expand_tilde_path(root.as_ref()),
        }
    }

    /// Resolve the workspace root.
    ///
    /// Checked in order: explicit path, `ETERNAL_MEMORY_WORKSPACE`,
    /// then `~/.openclaw/workspace`.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = explicit {
            return Ok(Self::new(path));
        }
        if let Some(path) = env_parser::workspace_override()? {
            return Ok(Self::new(path));
        }
        Ok(Self::new(default_root()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Hidden directory for tool-owned state.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(".eternal-memory")
    }

    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join("config.json")
    }

    pub fn default_store_path(&self) -> PathBuf {
        self.state_dir().join("store")
    }

    pub fn daily_log_dir(&self) -> PathBuf {
        self.root.join("memory")
    }

    /// Absolute form of a configured path; relative paths hang off the root.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        let path = expand_tilde_path(path);
        if path.is_absolute() {
            path
        } else {
            self.root.join(path)
        }
    }
}

fn default_root() -> PathBuf {
    // Use home directory with sensible fallback for systems without HOME
    let home = dirs::home_dir().unwrap_or_else(|| {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
    });
    home.join(".openclaw").join("workspace")
}

/// Expand `~` to home directory (returns new PathBuf).
pub fn expand_tilde_path(path: &Path) -> PathBuf {
    if path.starts_with("~") {
        if let Some(home) = dirs::home_dir() {
            let rest = path.strip_prefix("~").unwrap_or(Path::new(""));
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
