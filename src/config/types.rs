//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::hugo::DEFAULT_BINARY;

/// Listing of the official theme registry.
pub const DEFAULT_THEMES_CATALOG_URL: &str =
    "https://api.github.com/repos/gohugoio/hugoThemes/contents";

/// User settings, read from `.gohugo.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Site config file, relative to the project root.
    pub config: String,
    /// Dev server port.
    pub port: u16,
    /// Reveal the server output surface when the server starts.
    pub show_terminal: bool,
    /// Hugo executable.
    pub binary: String,
    /// Theme registry listing endpoint.
    pub themes_catalog_url: String,
    /// Where downloaded theme archives are written before extraction.
    /// Defaults to the home directory.
    pub download_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: "config.toml".to_string(),
            port: 3000,
            show_terminal: true,
            binary: DEFAULT_BINARY.to_string(),
            themes_catalog_url: DEFAULT_THEMES_CATALOG_URL.to_string(),
            download_dir: None,
        }
    }
}

impl Settings {
    /// Resolve the settings against a project root.
    #[must_use]
    pub fn snapshot(&self, root: &Path) -> ConfigSnapshot {
        ConfigSnapshot {
            config_path: root.join(&self.config),
            port: self.port,
            show_terminal: self.show_terminal,
        }
    }

    /// Directory for temporary theme archives.
    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
    }
}

/// Settings resolved for one command invocation.
///
/// Recomputed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSnapshot {
    /// Absolute path of the site config file.
    pub config_path: PathBuf,
    /// Dev server port.
    pub port: u16,
    /// Whether the server surface is shown on start.
    pub show_terminal: bool,
}
