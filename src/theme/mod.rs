//! Theme registry listing and theme installation.

mod archive;
mod catalog;
mod installer;

pub use archive::*;
pub use catalog::*;
pub use installer::*;

use std::path::PathBuf;

use reqwest::Client;

/// Errors from theme operations.
#[derive(thiserror::Error, Debug)]
pub enum ThemeError {
    /// The workspace has no site config file.
    #[error("Current Workspace is not a HUGO Project")]
    NotAProject { config_path: PathBuf },

    /// Fetching the theme archive failed.
    #[error("Unable to download theme from: {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Fetching the registry listing failed.
    #[error("Unable to fetch Hugo themes: {0}")]
    Catalog(#[source] reqwest::Error),

    /// The archive could not be unpacked.
    #[error("Failed to extract contents: {}", path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Neither the response nor the archive named the extracted folder.
    #[error("Unable to determine the extracted theme folder")]
    UnknownArchiveRoot,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the HTTP client used for GitHub requests.
///
/// GitHub rejects API requests without a `User-Agent`. No timeouts are set;
/// a stalled fetch simply never completes.
///
/// # Errors
///
/// Returns `ThemeError::Catalog` if the TLS backend cannot be initialised.
pub fn build_http_client() -> Result<Client, ThemeError> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(ThemeError::Catalog)
}
