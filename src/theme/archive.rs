//! Theme archive download and extraction.

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;

use super::ThemeError;

static DISPOSITION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"filename=(\w[\w-]+)\.zip").expect("valid regex"));

/// File name of the temporary archive.
pub const ARCHIVE_FILE_NAME: &str = "temp_theme.hugo.zip";

/// A downloaded archive waiting to be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    /// Where the archive was written.
    pub path: PathBuf,
    /// Top-level folder name announced by `Content-Disposition`, or empty.
    pub name: String,
}

/// Folder name from a `Content-Disposition` header value.
#[must_use]
pub fn archive_name_from_disposition(header: Option<&str>) -> String {
    header
        .and_then(|h| DISPOSITION_NAME.captures(h))
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Fetch `url` into `dest`.
///
/// # Errors
///
/// Returns `ThemeError::Download` for network or HTTP failures and
/// `ThemeError::Io` if the file cannot be written.
pub async fn download_archive(
    client: &Client,
    url: &str,
    dest: &Path,
) -> Result<DownloadedArchive, ThemeError> {
    let download_err = |source| ThemeError::Download {
        url: url.to_string(),
        source,
    };

    tracing::debug!(url, dest = %dest.display(), "Downloading theme archive");
    let response = client
        .get(url)
        .header("Accept", "application/zip")
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(download_err)?;

    let name = archive_name_from_disposition(
        response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok()),
    );
    let bytes = response.bytes().await.map_err(download_err)?;

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(dest, &bytes).await?;
    tracing::info!(url, bytes = bytes.len(), name = %name, "Theme archive downloaded");

    Ok(DownloadedArchive {
        path: dest.to_path_buf(),
        name,
    })
}

/// Unpack `archive` into `dest`, overwriting existing files.
///
/// Entries whose names would escape `dest` are skipped. Returns the name of
/// the archive's top-level folder, if it has one.
///
/// # Errors
///
/// Returns `ThemeError::Extract` for a corrupt archive and `ThemeError::Io`
/// for filesystem failures.
pub fn extract_archive(archive: &Path, dest: &Path) -> Result<Option<String>, ThemeError> {
    let extract_err = |source| ThemeError::Extract {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file).map_err(extract_err)?;
    let mut root: Option<String> = None;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(extract_err)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(name = entry.name(), "Skipping unsafe archive entry");
            continue;
        };
        let relative = relative.to_path_buf();

        if root.is_none() {
            if let Some(Component::Normal(first)) = relative.components().next() {
                root = Some(first.to_string_lossy().into_owned());
            }
        }

        let target = dest.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            std::io::copy(&mut entry, &mut out)?;
        }
    }

    tracing::debug!(archive = %archive.display(), entries = zip.len(), "Archive extracted");
    Ok(root)
}

/// Move `src` to `dest`, deleting whatever already occupies `dest`.
///
/// # Errors
///
/// Returns an I/O error if the removal or rename fails.
pub async fn replace_dir(src: &Path, dest: &Path) -> std::io::Result<()> {
    if src == dest {
        return Ok(());
    }
    if tokio::fs::try_exists(dest).await? {
        tokio::fs::remove_dir_all(dest).await?;
    }
    tokio::fs::rename(src, dest).await
}
