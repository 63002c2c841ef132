//! The official Hugo theme registry.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::ThemeError;

static COMMIT_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"tree/\b[0-9a-f]{5,40}\b").expect("valid regex"));

/// A theme listed in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDescriptor {
    pub name: String,
    /// Repository URL.
    pub url: String,
}

/// One item of the GitHub contents listing.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub html_url: Option<String>,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Keep submodule entries (zero-size files with a URL) and point them at the
/// repository root instead of the pinned commit.
#[must_use]
pub fn themes_from_entries(entries: Vec<CatalogEntry>) -> Vec<ThemeDescriptor> {
    entries
        .into_iter()
        .filter(|e| e.kind == "file" && e.size == 0)
        .filter_map(|e| {
            let url = e.html_url.filter(|u| !u.is_empty())?;
            Some(ThemeDescriptor {
                name: e.name,
                url: COMMIT_SEGMENT.replace(&url, "").into_owned(),
            })
        })
        .collect()
}

/// Registry listing, fetched at most once.
///
/// The list is never invalidated: themes published after the first fetch
/// are not seen until the process restarts.
#[derive(Debug)]
pub struct ThemeCatalog {
    client: Client,
    url: String,
    cache: OnceCell<Vec<ThemeDescriptor>>,
}

impl ThemeCatalog {
    #[must_use]
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            cache: OnceCell::new(),
        }
    }

    /// Whether the listing has been fetched.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.cache.initialized()
    }

    /// The registry's themes, fetched on first use.
    ///
    /// A failed fetch leaves the cache empty so the next call retries.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::Catalog` if the request or JSON decoding fails.
    pub async fn themes(&self) -> Result<&[ThemeDescriptor], ThemeError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Vec::as_slice)
    }

    async fn fetch(&self) -> Result<Vec<ThemeDescriptor>, ThemeError> {
        tracing::debug!(url = %self.url, "Fetching theme catalog");
        let entries: Vec<CatalogEntry> = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(ThemeError::Catalog)?
            .json()
            .await
            .map_err(ThemeError::Catalog)?;
        let themes = themes_from_entries(entries);
        tracing::info!(count = themes.len(), "Theme catalog fetched");
        Ok(themes)
    }
}
