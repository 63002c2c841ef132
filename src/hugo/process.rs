//! Hugo process spawning and control.
//!
//! Every Hugo invocation goes through the platform shell so the executable is
//! resolved from `PATH` exactly as a user typing the command would see it.
//! A missing binary therefore does not fail the spawn: the shell reports it
//! on stderr and exits with a non-zero status.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{ChildStderr, ChildStdout, Command};
use tokio::sync::oneshot;

/// Default executable name, resolved through `PATH`.
pub const DEFAULT_BINARY: &str = "hugo";

/// Error type for process spawning operations.
#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    /// The shell itself could not be started.
    #[error("Shell not found")]
    ShellNotFound,
    /// Permission denied when spawning.
    #[error("Permission denied")]
    PermissionDenied,
    /// The process's output pipes were already taken.
    #[error("Process streams not available")]
    StreamsUnavailable,
    /// Other I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SpawnError {
    /// Create a `SpawnError` from an I/O error, classifying common cases.
    fn from_io(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::ShellNotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }
}

/// Signal sent by [`HugoProcess::terminate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TermSignal {
    /// Polite termination request (`SIGTERM`).
    #[default]
    Term,
    /// Interrupt, as if Ctrl-C was pressed (`SIGINT`).
    Interrupt,
    /// Unconditional kill (`SIGKILL`).
    Kill,
}

/// Builder for a single Hugo invocation.
#[derive(Debug, Clone)]
pub struct HugoCommand {
    binary: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl Default for HugoCommand {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            args: Vec::new(),
            working_dir: None,
        }
    }
}

impl HugoCommand {
    /// Create a command with the given raw arguments.
    #[must_use]
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// `hugo version`
    #[must_use]
    pub fn version() -> Self {
        Self::new(["version"])
    }

    /// `hugo new site <path>`
    #[must_use]
    pub fn new_site(path: &Path) -> Self {
        Self::new(["new".to_string(), "site".to_string(), path_arg(path)])
    }

    /// `hugo new --config <config> [--kind <archetype>] <content>`
    #[must_use]
    pub fn new_content(config: &Path, kind: Option<&str>, content: &str) -> Self {
        let mut args = vec!["new".to_string(), "--config".to_string(), path_arg(config)];
        if let Some(kind) = kind {
            args.push("--kind".to_string());
            args.push(kind.to_string());
        }
        args.push(content.to_string());
        Self::new(args)
    }

    /// `hugo server -D --config <config> --port <port>`
    #[must_use]
    pub fn server(config: &Path, port: u16) -> Self {
        Self::new([
            "server".to_string(),
            "-D".to_string(),
            "--config".to_string(),
            path_arg(config),
            "--port".to_string(),
            port.to_string(),
        ])
    }

    /// `hugo --config <config>`, a production build.
    #[must_use]
    pub fn build(config: &Path) -> Self {
        Self::new(["--config".to_string(), path_arg(config)])
    }

    /// Use a different executable (tests point this at a fake script).
    #[must_use]
    pub fn binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Set the working directory, normally the project root.
    #[must_use]
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Get the argument vector passed to the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Get the executable name.
    #[must_use]
    pub fn get_binary(&self) -> &str {
        &self.binary
    }

    /// Get the working directory, if set.
    #[must_use]
    pub fn get_working_dir(&self) -> Option<&PathBuf> {
        self.working_dir.as_ref()
    }

    /// Render the shell command line, quoting every word.
    #[must_use]
    pub fn command_line(&self) -> String {
        std::iter::once(&self.binary)
            .chain(self.args.iter())
            .map(|word| shell_escape::escape(word.as_str().into()).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Spawn the command through the shell.
    ///
    /// # Errors
    ///
    /// Returns `SpawnError` if the shell cannot be started. A missing Hugo
    /// executable is reported later on the process's stderr.
    pub fn spawn(&self) -> Result<HugoProcess, SpawnError> {
        let line = self.command_line();
        let mut cmd = shell_command(&line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(false);

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(SpawnError::from_io)?;
        let pid = child.id();
        tracing::debug!(pid = ?pid, command = %line, "Spawned hugo");

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (exit_tx, exit_rx) = oneshot::channel();
        let (kill_tx, mut kill_rx) = tokio::sync::mpsc::unbounded_channel::<TermSignal>();

        // The child is owned by this task; the handle only keeps the pid and
        // a way to ask for termination.
        tokio::spawn(async move {
            let status = loop {
                let signal = tokio::select! {
                    status = child.wait() => break status,
                    Some(signal) = kill_rx.recv() => signal,
                };
                tracing::debug!(?signal, "Killing hugo child");
                let _ = child.start_kill();
            };
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to wait for hugo");
                    None
                }
            };
            tracing::debug!(pid = ?pid, code = ?code, "Hugo exited");
            let _ = exit_tx.send(code);
        });

        Ok(HugoProcess {
            pid,
            stdout,
            stderr,
            exit: Some(exit_rx),
            kill_tx,
            #[cfg(test)]
            refuse_signals: false,
        })
    }
}

#[cfg(unix)]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    // `exec` replaces the shell so signals reach Hugo itself.
    cmd.arg("-c").arg(format!("exec {line}"));
    cmd
}

#[cfg(not(unix))]
fn shell_command(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// A spawned Hugo process.
///
/// The exit code is delivered exactly once through [`HugoProcess::take_exit`].
#[derive(Debug)]
pub struct HugoProcess {
    pid: Option<u32>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
    exit: Option<oneshot::Receiver<Option<i32>>>,
    kill_tx: tokio::sync::mpsc::UnboundedSender<TermSignal>,
    /// Makes [`HugoProcess::terminate`] report a rejected signal.
    #[cfg(test)]
    pub(crate) refuse_signals: bool,
}

impl HugoProcess {
    /// Get the process ID.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        self.pid
    }

    /// Take ownership of the stdout handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Take ownership of the stderr handle.
    ///
    /// This can only be called once; subsequent calls return `None`.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Take the one-shot exit notification.
    ///
    /// Resolves to the exit code, or `None` when the process was ended by a
    /// signal. This can only be called once.
    pub fn take_exit(&mut self) -> Option<oneshot::Receiver<Option<i32>>> {
        self.exit.take()
    }

    /// Send a termination signal.
    ///
    /// Returns whether the signal was accepted. Termination is asynchronous:
    /// `true` does not mean the process has already exited.
    pub fn terminate(&self, signal: TermSignal) -> bool {
        #[cfg(test)]
        {
            if self.refuse_signals {
                return false;
            }
        }

        #[cfg(unix)]
        {
            self.terminate_unix(signal)
        }

        #[cfg(not(unix))]
        {
            self.kill_tx.send(signal).is_ok()
        }
    }

    #[cfg(unix)]
    fn terminate_unix(&self, signal: TermSignal) -> bool {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        if self.kill_tx.is_closed() {
            // Waiter task is gone, the process has already been reaped.
            return false;
        }
        let Some(pid) = self.pid else {
            return false;
        };
        let nix_signal = match signal {
            TermSignal::Term => Signal::SIGTERM,
            TermSignal::Interrupt => Signal::SIGINT,
            TermSignal::Kill => Signal::SIGKILL,
        };
        let nix_pid = Pid::from_raw(i32::try_from(pid).unwrap_or(i32::MAX));
        match kill(nix_pid, nix_signal) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(pid, error = %e, "Failed to signal hugo");
                false
            }
        }
    }
}
