//! Theme commands.

use crate::theme::ThemeInstaller;
use crate::ui::{Cancelled, InputRequest, PickItem};

use super::{CommandError, Workbench};

/// Suggested theme for the add-theme prompt.
pub const DEFAULT_THEME_URL: &str = "https://github.com/theNewDynamic/gohugo-theme-ananke";

impl Workbench {
    /// Install a theme by URL, prompting for it when `url` is `None`.
    ///
    /// A dismissed prompt ends the command without a message.
    ///
    /// # Errors
    ///
    /// Returns the installer's `ThemeError`.
    pub async fn add_theme(&self, url: Option<String>) -> Result<(), CommandError> {
        let url = match url {
            Some(url) => url,
            None => match self.prompter.input(&InputRequest {
                prompt: "Enter theme repo name".to_string(),
                placeholder: DEFAULT_THEME_URL.to_string(),
                default: DEFAULT_THEME_URL.to_string(),
            }) {
                Ok(url) => url,
                Err(Cancelled) => return Ok(()),
            },
        };
        self.install_theme(&url).await
    }

    /// Pick a theme from the registry and install it.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::Catalog` if the registry cannot be fetched, or
    /// the installer's error.
    pub async fn select_theme(&self) -> Result<(), CommandError> {
        self.notifier.progress("Fetching Hugo Themes", 0, "");
        let themes = self.catalog.themes().await?;
        let items: Vec<PickItem> = themes
            .iter()
            .map(|t| PickItem {
                label: t.name.clone(),
                description: t.url.clone(),
            })
            .collect();
        let Some(theme) = self
            .prompter
            .pick("Select Theme", &items)
            .and_then(|i| themes.get(i))
        else {
            return Ok(());
        };
        let url = theme.url.clone();
        self.install_theme(&url).await
    }

    async fn install_theme(&self, url: &str) -> Result<(), CommandError> {
        let installer = ThemeInstaller::new(
            self.client.clone(),
            &self.root,
            &self.snapshot(),
            self.settings.download_dir(),
        );
        let outcome = installer.install(url, self.notifier.as_ref()).await?;
        tracing::debug!(?outcome, "Theme command finished");
        Ok(())
    }
}
