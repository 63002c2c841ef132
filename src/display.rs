//! Console implementations of the host surfaces.
//!
//! Notifications are printed with a timestamp and a colored tag, the server
//! surface writes straight to stdout, and prompts read lines from stdin.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use owo_colors::OwoColorize;

use crate::ui::{
    resolve_input, Cancelled, DisplaySurface, InputRequest, MessageOptions, MessageStatus,
    Notifier, PickItem, Prompter, SurfaceFactory,
};

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Render a notification line.
#[must_use]
pub fn format_message(message: &str, options: MessageOptions) -> String {
    let tag = match options.status {
        MessageStatus::Info => "[INFO]".cyan().bold().to_string(),
        MessageStatus::Warning => "[WARN]".yellow().bold().to_string(),
        MessageStatus::Error => "[ERROR]".red().bold().to_string(),
    };
    if options.modal {
        let rule = "─".repeat(40);
        format!("{tag}\n{}\n{message}\n{}", rule.dimmed(), rule.dimmed())
    } else {
        format!("{tag} {message}")
    }
}

/// Prints notifications to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, options: MessageOptions) {
        match options.status {
            MessageStatus::Error => tracing::debug!(message, "Error notification"),
            _ => tracing::trace!(message, "Notification"),
        }
        println!("{} {}", timestamp().dimmed(), format_message(message, options));
        let _ = io::stdout().flush();
    }

    fn progress(&self, title: &str, increment: u8, message: &str) {
        println!(
            "{} {} {} {:>3}% {}",
            timestamp().dimmed(),
            "[PROGRESS]".magenta().bold(),
            title,
            increment,
            message.dimmed()
        );
        let _ = io::stdout().flush();
    }
}

/// Server output pane on stdout.
///
/// Output is only printed once the surface has been shown.
#[derive(Debug)]
pub struct ConsoleSurface {
    title: String,
    visible: AtomicBool,
    disposed: AtomicBool,
}

impl ConsoleSurface {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            visible: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }
}

impl DisplaySurface for ConsoleSurface {
    fn write(&self, text: &str) {
        if self.visible.load(Ordering::SeqCst) && !self.is_disposed() {
            print!("{text}");
            let _ = io::stdout().flush();
        }
    }

    fn show(&self) {
        if !self.visible.swap(true, Ordering::SeqCst) {
            println!("{}", format!("── {} ──", self.title).blue().bold());
        }
    }

    fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) && self.visible.load(Ordering::SeqCst) {
            println!("{}", format!("── {} closed ──", self.title).dimmed());
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Opens [`ConsoleSurface`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSurfaceFactory;

impl SurfaceFactory for ConsoleSurfaceFactory {
    fn open(&self, title: &str) -> Arc<dyn DisplaySurface> {
        Arc::new(ConsoleSurface::new(title))
    }
}

/// Asks questions on stdin. End of input counts as a dismissal.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line() -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl Prompter for StdinPrompter {
    fn input(&self, request: &InputRequest) -> Result<String, Cancelled> {
        print!(
            "{} {} ",
            request.prompt.bold(),
            format!("[{}]", request.placeholder).dimmed()
        );
        let _ = io::stdout().flush();
        resolve_input(Self::read_line(), &request.default)
    }

    fn pick(&self, title: &str, items: &[PickItem]) -> Option<usize> {
        println!("{}", title.bold());
        for (i, item) in items.iter().enumerate() {
            println!("  {:>3}. {} {}", i + 1, item.label, item.description.dimmed());
        }
        print!("{} ", "Number:".bold());
        let _ = io::stdout().flush();
        Self::read_line()?
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .filter(|i| *i < items.len())
    }
}
