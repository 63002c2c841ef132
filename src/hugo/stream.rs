//! Channel plumbing for Hugo stdout/stderr.
//!
//! Each stream gets a reader task that forwards chunks into its own channel.
//! A chunk is whatever complete lines one read produced; a trailing partial
//! line is held back until its newline (or end of stream) arrives. Consumers decide whether they want only the
//! first chunk ([`Delivery::Once`]) or every chunk ([`Delivery::Every`]).
//! A single chunk may hold several lines, and with `Once` lines arriving in
//! a later chunk are never seen.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, oneshot};

use super::HugoProcess;

/// Default buffer size for chunk channels.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Read size for a single chunk.
const CHUNK_SIZE: usize = 8 * 1024;

/// How many chunks a listener observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Only the first chunk; the rest of the stream is drained and ignored.
    Once,
    /// Every chunk, in emission order.
    Every,
}

/// Output channels of one spawned process.
#[derive(Debug)]
pub struct OutputStreams {
    /// Chunks written to stdout.
    pub stdout: mpsc::Receiver<String>,
    /// Chunks written to stderr.
    pub stderr: mpsc::Receiver<String>,
    /// One-shot exit notification.
    pub exit: oneshot::Receiver<Option<i32>>,
}

impl OutputStreams {
    /// Take the process's streams and start forwarding them.
    ///
    /// Returns `None` if the streams were already taken.
    pub fn attach(process: &mut HugoProcess) -> Option<Self> {
        let stdout = process.take_stdout()?;
        let stderr = process.take_stderr()?;
        let exit = process.take_exit()?;
        Some(Self {
            stdout: into_channel(stdout, DEFAULT_CHANNEL_BUFFER),
            stderr: into_channel(stderr, DEFAULT_CHANNEL_BUFFER),
            exit,
        })
    }
}

/// Forward an async reader into a channel of lossy UTF-8 chunks.
///
/// Every chunk but the last ends with a newline, so a line written in
/// several pieces is never split across chunks.
pub fn into_channel<R>(mut reader: R, buffer: usize) -> mpsc::Receiver<String>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(buffer);
    tokio::spawn(async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => {
                    pending.extend_from_slice(&buf[..n]);
                    let Some(last_newline) = pending.iter().rposition(|b| *b == b'\n') else {
                        continue;
                    };
                    let rest = pending.split_off(last_newline + 1);
                    let chunk = String::from_utf8_lossy(&pending).into_owned();
                    pending = rest;
                    // A closed receiver (Once listener) just means nobody
                    // cares; keep reading so the child never blocks on a
                    // full pipe.
                    let _ = tx.send(chunk).await;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Stream read failed");
                    break;
                }
            }
        }
        if !pending.is_empty() {
            let _ = tx.send(String::from_utf8_lossy(&pending).into_owned()).await;
        }
    });
    rx
}

/// Receive according to `delivery`, invoking `f` per observed chunk.
///
/// Returns once the stream ends (or after the first chunk for `Once`).
pub async fn listen<F>(rx: &mut mpsc::Receiver<String>, delivery: Delivery, mut f: F)
where
    F: FnMut(String),
{
    match delivery {
        Delivery::Once => {
            if let Some(chunk) = rx.recv().await {
                f(chunk);
            }
            rx.close();
        }
        Delivery::Every => {
            while let Some(chunk) = rx.recv().await {
                f(chunk);
            }
        }
    }
}

/// First chunk of stdout and stderr of a short-lived command.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FirstChunks {
    /// First stdout chunk, if any was written.
    pub stdout: Option<String>,
    /// First stderr chunk, if any was written.
    pub stderr: Option<String>,
}

/// Observe the first chunk of each stream, then wait for the exit code.
pub async fn collect_once(mut streams: OutputStreams) -> (FirstChunks, Option<i32>) {
    let mut first = FirstChunks::default();
    let stdout = listen(&mut streams.stdout, Delivery::Once, |c| {
        first.stdout.get_or_insert(c);
    });
    let mut stderr_first = None;
    let stderr = listen(&mut streams.stderr, Delivery::Once, |c| {
        stderr_first.get_or_insert(c);
    });
    tokio::join!(stdout, stderr);
    first.stderr = stderr_first;
    let code = streams.exit.await.unwrap_or(None);
    (first, code)
}
