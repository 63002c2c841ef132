//! Theme installation pipeline.
//!
//! validate project → derive name → (skip if present) download → extract →
//! delete archive → rename folder → rewrite `theme` in the site config.
//!
//! Each step short-circuits on failure. Nothing is rolled back: a failed
//! extraction can leave a partial folder under `themes/`. Concurrent installs
//! are not guarded against.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;

use crate::config::{rewrite_config_key, ConfigSnapshot};
use crate::ui::Notifier;

use super::{download_archive, extract_archive, replace_dir, ThemeError, ARCHIVE_FILE_NAME};

static GITHUB_REPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github.com/[\w\d][\w\d-]*/(?P<name>[\w\d-]+)").expect("valid regex")
});

/// Name used when the URL is not a GitHub repository.
pub const FALLBACK_THEME_NAME: &str = "active-theme";

/// Config key pointing at the active theme.
pub const THEME_KEY: &str = "theme";

/// Directory name for a theme repository URL.
#[must_use]
pub fn canonical_theme_name(url: &str) -> String {
    GITHUB_REPO
        .captures(url)
        .map_or_else(|| FALLBACK_THEME_NAME.to_string(), |c| c["name"].to_string())
}

/// Zip archive of a repository's `master` branch.
#[must_use]
pub fn archive_url(repo_url: &str) -> String {
    format!("{}/archive/master.zip", repo_url.trim_end_matches('/'))
}

/// What an install did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Downloaded, extracted and activated.
    Installed { name: String },
    /// The folder already existed; only the config was rewritten.
    AlreadyPresent { name: String },
}

impl InstallOutcome {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Installed { name } | Self::AlreadyPresent { name } => name,
        }
    }
}

/// Installs themes into one project.
#[derive(Debug, Clone)]
pub struct ThemeInstaller {
    client: Client,
    root: PathBuf,
    config_path: PathBuf,
    download_dir: PathBuf,
}

impl ThemeInstaller {
    #[must_use]
    pub fn new(client: Client, root: &Path, snapshot: &ConfigSnapshot, download_dir: PathBuf) -> Self {
        Self {
            client,
            root: root.to_path_buf(),
            config_path: snapshot.config_path.clone(),
            download_dir,
        }
    }

    /// `<root>/themes`
    #[must_use]
    pub fn themes_dir(&self) -> PathBuf {
        self.root.join("themes")
    }

    /// Install the theme at `repo_url` and make it the active theme.
    ///
    /// An existing folder with the theme's name counts as installed; its
    /// contents are not checked.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::NotAProject` when the site config is missing, and
    /// download, extraction or I/O errors from the failing step.
    pub async fn install(
        &self,
        repo_url: &str,
        notifier: &dyn Notifier,
    ) -> Result<InstallOutcome, ThemeError> {
        if !tokio::fs::try_exists(&self.config_path).await.unwrap_or(false) {
            return Err(ThemeError::NotAProject {
                config_path: self.config_path.clone(),
            });
        }

        let name = canonical_theme_name(repo_url);
        let themes_dir = self.themes_dir();
        let theme_dir = themes_dir.join(&name);
        let title = format!("Applying {name} Theme");

        notifier.progress(&title, 0, &format!("Downloading Theme: {name}"));

        if tokio::fs::try_exists(&theme_dir).await? {
            tracing::info!(theme = %name, "Theme already present, skipping download");
            rewrite_config_key(&self.config_path, THEME_KEY, &name).await?;
            notifier.progress(&title, 100, &format!("Applied Theme: {name}"));
            return Ok(InstallOutcome::AlreadyPresent { name });
        }

        let url = archive_url(repo_url);
        let archive_path = self.download_dir.join(ARCHIVE_FILE_NAME);
        let downloaded = download_archive(&self.client, &url, &archive_path).await?;

        notifier.progress(&title, 75, &format!("Unzipping Theme: {name}"));
        tokio::fs::create_dir_all(&themes_dir).await?;
        let extracted_root = {
            let archive = downloaded.path.clone();
            let dest = themes_dir.clone();
            tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
                .await
                .map_err(std::io::Error::other)??
        };

        notifier.progress(&title, 95, "Deleting temporary downloaded file");
        tokio::fs::remove_file(&downloaded.path).await?;

        let folder = if downloaded.name.is_empty() {
            extracted_root.ok_or(ThemeError::UnknownArchiveRoot)?
        } else {
            downloaded.name
        };
        replace_dir(&themes_dir.join(&folder), &theme_dir).await?;
        rewrite_config_key(&self.config_path, THEME_KEY, &name).await?;

        tracing::info!(theme = %name, folder = %folder, "Theme installed");
        notifier.progress(&title, 100, &format!("Applied Theme: {name}"));
        Ok(InstallOutcome::Installed { name })
    }
}
