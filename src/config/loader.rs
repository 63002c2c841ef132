//! Settings file loader.

use std::path::{Path, PathBuf};

use super::Settings;

/// Name of the per-project settings file.
pub const PROJECT_SETTINGS_FILE: &str = ".gohugo.toml";

/// Settings loader that searches multiple locations.
#[derive(Debug)]
pub struct ConfigLoader {
    /// Search paths in order of priority.
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for a project root.
    ///
    /// Searches `<root>/.gohugo.toml`, then `~/.config/gohugo/config.toml`.
    #[must_use]
    pub fn new(root: &Path) -> Self {
        let mut search_paths = vec![root.join(PROJECT_SETTINGS_FILE)];

        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("gohugo").join("config.toml"));
        }

        Self { search_paths }
    }

    /// Create a loader with a specific settings file path.
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            search_paths: vec![path],
        }
    }

    /// Load settings from the first available file, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be parsed.
    pub fn load(&self) -> Result<Settings, ConfigError> {
        for path in &self.search_paths {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading settings file");
                return Self::load_from_path(path);
            }
        }

        tracing::debug!("No settings file found, using defaults");
        Ok(Settings::default())
    }

    fn load_from_path(path: &Path) -> Result<Settings, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the search paths for debugging.
    #[must_use]
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

/// Errors that can occur during settings loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}
