//! Dev server lifecycle.
//!
//! The controller owns the one [`ServerSession`] and is the only thing that
//! signals its process. Starting is fire-and-forget: watcher tasks mirror
//! output to the display surface, turn it into notifications, and clear the
//! session when the process exits.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ConfigSnapshot;
use crate::hugo::parse::{
    colorize_levels, describe_stderr, local_url, parse_server_output, to_lines, LineSplitter,
    ServerSignal,
};
use crate::hugo::{listen, Delivery, HugoCommand, OutputStreams, SpawnError, TermSignal};
use crate::ui::{MessageOptions, Notifier, SurfaceFactory};

use super::{ServerSession, ServerState};

/// Title of the server output surface.
pub const SURFACE_TITLE: &str = "GoHugo Server";

/// Ctrl-C as typed into the surface.
pub const ETX: u8 = 3;

/// Result of a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Signal accepted, session cleared.
    Stopped,
    /// Nothing was running.
    NotRunning,
    /// Signal rejected; the server is still tracked.
    Rejected(Option<u32>),
}

/// Starts and stops the Hugo dev server.
pub struct ServerController {
    session: Arc<Mutex<ServerSession>>,
    notifier: Arc<dyn Notifier>,
    surfaces: Arc<dyn SurfaceFactory>,
    binary: String,
}

impl ServerController {
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>, surfaces: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            session: Arc::new(Mutex::new(ServerSession::default())),
            notifier,
            surfaces,
            binary: crate::hugo::DEFAULT_BINARY.to_string(),
        }
    }

    /// Use a different Hugo executable.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, ServerSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn state(&self) -> ServerState {
        self.lock().state()
    }

    /// Pid of the running server.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.lock().pid()
    }

    /// Number of starts so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation()
    }

    /// Start the dev server, stopping a running one first.
    ///
    /// The new session is `Running` as soon as the shell is spawned; a Hugo
    /// failure shows up later through stderr and the exit watcher. The old
    /// process is only signalled, not awaited.
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the shell cannot be started.
    pub fn start(&self, root: &Path, snapshot: &ConfigSnapshot) -> Result<(), SpawnError> {
        let port = snapshot.port;
        if self.state() == ServerState::Running {
            self.stop_with(
                Some(format!(
                    "Stopped already running server at {}",
                    local_url(port)
                )),
                MessageOptions::warning(),
            );
        }

        let surface = self.surfaces.open(SURFACE_TITLE);
        let spawned = HugoCommand::server(&snapshot.config_path, port)
            .binary(&self.binary)
            .working_dir(root)
            .spawn();
        let mut process = match spawned {
            Ok(process) => process,
            Err(e) => {
                surface.dispose();
                return Err(e);
            }
        };
        let Some(streams) = OutputStreams::attach(&mut process) else {
            surface.dispose();
            return Err(SpawnError::StreamsUnavailable);
        };

        let pid = process.id();
        let generation = {
            let mut session = self.lock();
            session.generation += 1;
            session.surface = Some(Arc::clone(&surface));
            session.transition(Some(process));
            session.generation
        };
        tracing::info!(?pid, port, generation, "Dev server started");

        let OutputStreams {
            mut stdout,
            mut stderr,
            exit,
        } = streams;

        let notifier = Arc::clone(&self.notifier);
        let mirror = Arc::clone(&surface);
        tokio::spawn(async move {
            listen(&mut stdout, Delivery::Every, |chunk| {
                let lines = to_lines(&chunk, LineSplitter::Newline);
                for line in &lines {
                    mirror.write(&format!("{}\r\n", colorize_levels(line)));
                }
                match parse_server_output(&lines, port) {
                    Some(ServerSignal::Ready(message)) => {
                        notifier.notify(&message, MessageOptions::info());
                    }
                    Some(ServerSignal::Failed(line)) => {
                        notifier.notify(&line, MessageOptions::error());
                    }
                    None => {}
                }
            })
            .await;
        });

        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            listen(&mut stderr, Delivery::Every, |chunk| {
                notifier.notify(&describe_stderr(&chunk), MessageOptions::error());
            })
            .await;
        });

        let session = Arc::clone(&self.session);
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let code = exit.await.unwrap_or(None);
            let mut session = session.lock().unwrap_or_else(PoisonError::into_inner);
            if session.generation != generation || session.process.is_none() {
                tracing::debug!(generation, ?code, "Stale server exited");
                return;
            }
            session.transition(None);
            drop(session);
            tracing::info!(generation, ?code, "Dev server exited");
            match code {
                Some(0) => {}
                Some(code) => notifier.notify(
                    &format!("Server exited with code {code}"),
                    MessageOptions::error(),
                ),
                None => notifier.notify("Server terminated by signal", MessageOptions::error()),
            }
        });

        if snapshot.show_terminal {
            surface.show();
        }
        Ok(())
    }

    /// Stop the dev server.
    pub fn stop(&self) -> StopOutcome {
        self.stop_with(None, MessageOptions::default())
    }

    /// Stop the dev server, reporting success with `message`.
    pub fn stop_with(&self, message: Option<String>, options: MessageOptions) -> StopOutcome {
        let mut session = self.lock();
        let Some(process) = session.process.as_ref() else {
            drop(session);
            self.notifier
                .notify("No Server Running", MessageOptions::warning());
            return StopOutcome::NotRunning;
        };

        let pid = process.id();
        if process.terminate(TermSignal::Term) {
            session.transition(None);
            let surface = session.surface.take();
            drop(session);
            tracing::info!(?pid, "Dev server stopped");
            self.notifier.notify(
                message.as_deref().unwrap_or("Server Stopped: Success"),
                options,
            );
            if let Some(surface) = surface {
                surface.dispose();
            }
            StopOutcome::Stopped
        } else {
            drop(session);
            let shown = pid.map_or_else(|| "unknown".to_string(), |p| p.to_string());
            self.notifier.notify(
                &format!("Unable to Stop Server running at PID: {shown}"),
                MessageOptions::error(),
            );
            StopOutcome::Rejected(pid)
        }
    }

    /// Input typed into the surface. Ctrl-C closes it, which stops the server.
    pub fn handle_input(&self, data: &[u8]) {
        if data.first() == Some(&ETX) {
            let surface = self.lock().surface.clone();
            if let Some(surface) = surface {
                surface.dispose();
            }
            self.surface_closed();
        }
    }

    /// The user closed the surface.
    pub fn surface_closed(&self) {
        if self.state() == ServerState::Running {
            self.stop();
        }
    }
}

impl std::fmt::Debug for ServerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerController")
            .field("session", &*self.lock())
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}
