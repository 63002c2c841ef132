//! Command dispatch.
//!
//! [`Workbench`] holds everything a command needs and maps each [`Command`]
//! to the process runner, theme installer or server controller. Failures
//! never escape [`Workbench::dispatch`]: cancellations are dropped silently
//! and everything else becomes an error notification.

mod content;
mod server;
mod site;
mod theme;

pub use content::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use reqwest::Client;

use crate::config::{ConfigSnapshot, Settings};
use crate::hugo::{HugoCommand, SpawnError};
use crate::server::ServerController;
use crate::theme::{build_http_client, ThemeCatalog, ThemeError};
use crate::ui::{Cancelled, MessageOptions, Notifier, Prompter, SurfaceFactory};

/// Editor-level commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the Hugo version.
    Version,
    /// Scaffold a new site.
    NewSite,
    /// Create a content file from an archetype.
    NewContent,
    /// Install a theme from a repository URL (prompted when `None`).
    AddTheme(Option<String>),
    /// Pick a theme from the registry and install it.
    SelectTheme,
    /// Start (or restart) the dev server.
    StartServer,
    /// Stop the dev server.
    StopServer,
    /// Production build.
    Build,
}

/// Errors surfaced by commands.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    /// The user dismissed an input.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    #[error("Failed to run hugo: {0}")]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Theme(#[from] ThemeError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything commands operate on.
pub struct Workbench {
    root: PathBuf,
    settings: Settings,
    notifier: Arc<dyn Notifier>,
    prompter: Arc<dyn Prompter>,
    client: Client,
    catalog: ThemeCatalog,
    server: ServerController,
}

impl Workbench {
    /// Create a workbench for the project at `root`.
    ///
    /// # Errors
    ///
    /// Returns `ThemeError::Catalog` if the HTTP client cannot be built.
    pub fn new(
        root: PathBuf,
        settings: Settings,
        notifier: Arc<dyn Notifier>,
        prompter: Arc<dyn Prompter>,
        surfaces: Arc<dyn SurfaceFactory>,
    ) -> Result<Self, ThemeError> {
        let client = build_http_client()?;
        let catalog = ThemeCatalog::new(client.clone(), settings.themes_catalog_url.clone());
        let server = ServerController::new(Arc::clone(&notifier), surfaces)
            .with_binary(settings.binary.clone());
        Ok(Self {
            root,
            settings,
            notifier,
            prompter,
            client,
            catalog,
            server,
        })
    }

    /// Current project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn server(&self) -> &ServerController {
        &self.server
    }

    #[must_use]
    pub fn catalog(&self) -> &ThemeCatalog {
        &self.catalog
    }

    /// Settings resolved against the current root.
    #[must_use]
    pub fn snapshot(&self) -> ConfigSnapshot {
        self.settings.snapshot(&self.root)
    }

    fn hugo(&self, command: HugoCommand) -> HugoCommand {
        command
            .binary(self.settings.binary.clone())
            .working_dir(&self.root)
    }

    fn notify(&self, message: &str, options: MessageOptions) {
        self.notifier.notify(message, options);
    }

    /// Run a command, reporting any failure.
    pub async fn dispatch(&mut self, command: Command) {
        tracing::debug!(?command, "Dispatching command");
        let result = match command {
            Command::Version => self.version().await,
            Command::NewSite => self.new_site().await,
            Command::NewContent => self.new_content().await,
            Command::AddTheme(url) => self.add_theme(url).await,
            Command::SelectTheme => self.select_theme().await,
            Command::StartServer => self.start_server(),
            Command::StopServer => {
                self.stop_server();
                Ok(())
            }
            Command::Build => self.build().await,
        };

        match result {
            Ok(()) => {}
            Err(CommandError::Cancelled(_)) => tracing::debug!("Command cancelled"),
            Err(e) => {
                tracing::warn!(error = %e, "Command failed");
                self.notify(&e.to_string(), MessageOptions::error());
            }
        }
    }
}

impl std::fmt::Debug for Workbench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workbench")
            .field("root", &self.root)
            .field("settings", &self.settings)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}
