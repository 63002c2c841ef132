//! Host surfaces the commands talk to.
//!
//! The commands never print or read directly. They report through a
//! [`Notifier`], ask through a [`Prompter`] and mirror server output to a
//! [`DisplaySurface`]. The binary wires these to the console; tests wire them
//! to the in-memory versions in [`memory`].

pub mod memory;

use std::sync::Arc;

/// Severity of a user-visible message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageStatus {
    #[default]
    Info,
    Warning,
    Error,
}

/// Presentation options for a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageOptions {
    /// Block until acknowledged. Defaults to `false`.
    pub modal: bool,
    /// Defaults to [`MessageStatus::Info`].
    pub status: MessageStatus,
}

impl MessageOptions {
    #[must_use]
    pub fn info() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn modal() -> Self {
        Self {
            modal: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn warning() -> Self {
        Self {
            status: MessageStatus::Warning,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn error() -> Self {
        Self {
            status: MessageStatus::Error,
            ..Self::default()
        }
    }
}

/// Sink for user-visible notifications.
pub trait Notifier: Send + Sync {
    /// Show a message.
    fn notify(&self, message: &str, options: MessageOptions);

    /// Report progress of a long operation. `increment` is a percentage.
    fn progress(&self, title: &str, increment: u8, message: &str) {
        tracing::info!(title, increment, message, "Progress");
    }
}

/// A terminal-like pane showing server output.
pub trait DisplaySurface: Send + Sync {
    /// Write already formatted text, including line endings.
    fn write(&self, text: &str);

    /// Reveal the surface.
    fn show(&self);

    /// Close the surface. Calling it twice is a no-op.
    fn dispose(&self);

    /// Whether [`DisplaySurface::dispose`] was called.
    fn is_disposed(&self) -> bool;
}

/// Opens display surfaces.
pub trait SurfaceFactory: Send + Sync {
    fn open(&self, title: &str) -> Arc<dyn DisplaySurface>;
}

/// The user dismissed an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cancelled")]
pub struct Cancelled;

/// A free-text question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRequest {
    pub prompt: String,
    pub placeholder: String,
    /// Returned when the user submits an empty answer.
    pub default: String,
}

/// One entry of a pick list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickItem {
    pub label: String,
    pub description: String,
}

/// Asks the user for input.
pub trait Prompter: Send + Sync {
    /// Ask for free text.
    ///
    /// # Errors
    ///
    /// Returns [`Cancelled`] when the user dismisses the input.
    fn input(&self, request: &InputRequest) -> Result<String, Cancelled>;

    /// Let the user pick one item. `None` when nothing was picked.
    fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize>;
}

/// Apply the default to a raw answer. `None` means the input was dismissed.
///
/// # Errors
///
/// Returns [`Cancelled`] for a dismissed input.
pub fn resolve_input(answer: Option<String>, default: &str) -> Result<String, Cancelled> {
    match answer {
        None => Err(Cancelled),
        Some(s) if s.is_empty() => Ok(default.to_string()),
        Some(s) => Ok(s),
    }
}
