//! In-memory surfaces for headless use.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{
    Cancelled, DisplaySurface, InputRequest, MessageOptions, Notifier, PickItem, Prompter,
    SurfaceFactory,
};

/// Records every notification.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: Mutex<Vec<(String, MessageOptions)>>,
    progress: Mutex<Vec<(u8, String)>>,
}

impl MemoryNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded messages.
    #[must_use]
    pub fn messages(&self) -> Vec<(String, MessageOptions)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Snapshot of recorded progress increments.
    #[must_use]
    pub fn progress_steps(&self) -> Vec<(u8, String)> {
        self.progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|(m, _)| m.contains(needle))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str, options: MessageOptions) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((message.to_string(), options));
    }

    fn progress(&self, _title: &str, increment: u8, message: &str) {
        self.progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((increment, message.to_string()));
    }
}

/// Buffers everything written to it.
#[derive(Debug, Default)]
pub struct MemorySurface {
    title: String,
    output: Mutex<String>,
    shown: AtomicBool,
    disposed: AtomicBool,
}

impl MemorySurface {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn output(&self) -> String {
        self.output
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_shown(&self) -> bool {
        self.shown.load(Ordering::SeqCst)
    }
}

impl DisplaySurface for MemorySurface {
    fn write(&self, text: &str) {
        if !self.is_disposed() {
            self.output
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_str(text);
        }
    }

    fn show(&self) {
        self.shown.store(true, Ordering::SeqCst);
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

/// Hands out [`MemorySurface`]s and remembers them.
#[derive(Debug, Default)]
pub struct MemorySurfaceFactory {
    opened: Mutex<Vec<Arc<MemorySurface>>>,
}

impl MemorySurfaceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All surfaces opened so far, oldest first.
    #[must_use]
    pub fn opened(&self) -> Vec<Arc<MemorySurface>> {
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SurfaceFactory for MemorySurfaceFactory {
    fn open(&self, title: &str) -> Arc<dyn DisplaySurface> {
        let surface = Arc::new(MemorySurface::new(title));
        self.opened
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::clone(&surface));
        surface
    }
}

/// Replays scripted answers.
///
/// Each `input` call pops the next answer; `None` answers (and running out)
/// behave like a dismissed input box.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    inputs: Mutex<VecDeque<Option<String>>>,
    picks: Mutex<VecDeque<Option<usize>>>,
}

impl ScriptedPrompter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_input(self, answer: Option<&str>) -> Self {
        self.inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(answer.map(str::to_string));
        self
    }

    #[must_use]
    pub fn with_pick(self, choice: Option<usize>) -> Self {
        self.picks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(choice);
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn input(&self, request: &InputRequest) -> Result<String, Cancelled> {
        let answer = self
            .inputs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten();
        super::resolve_input(answer, &request.default)
    }

    fn pick(&self, _title: &str, items: &[PickItem]) -> Option<usize> {
        self.picks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .flatten()
            .filter(|i| *i < items.len())
    }
}
