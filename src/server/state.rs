//! Server session state.

use std::sync::Arc;

use crate::hugo::HugoProcess;
use crate::ui::DisplaySurface;

/// Lifecycle state of the dev server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServerState {
    #[default]
    Stopped,
    Running,
}

/// The single dev-server session.
///
/// A present `process` means Hugo was spawned and has not reported exit.
/// `generation` increases with every start so watchers of an old process
/// can tell they are stale.
#[derive(Default)]
pub struct ServerSession {
    pub(crate) process: Option<HugoProcess>,
    pub(crate) surface: Option<Arc<dyn DisplaySurface>>,
    pub(crate) generation: u64,
}

impl ServerSession {
    #[must_use]
    pub fn state(&self) -> ServerState {
        if self.process.is_some() {
            ServerState::Running
        } else {
            ServerState::Stopped
        }
    }

    /// Pid of the active process.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(HugoProcess::id)
    }

    /// Number of starts so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn transition(&mut self, process: Option<HugoProcess>) {
        let from = self.state();
        self.process = process;
        tracing::debug!(?from, to = ?self.state(), generation = self.generation, "Server state transition");
    }
}

impl std::fmt::Debug for ServerSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSession")
            .field("state", &self.state())
            .field("pid", &self.pid())
            .field("has_surface", &self.surface.is_some())
            .field("generation", &self.generation)
            .finish()
    }
}
