//! # shellrelay Process Execution Utilities (`common::process`)
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! This module owns process creation for the relay: the [`ProcessSpec`] that the
//! dispatcher produces, the per-OS window capability that applies a
//! [`WindowMode`] to an OS command, and [`run_combined`], which spawns the child
//! and captures its combined output and duration.
//!
//! ## Window capability
//!
//! Window visibility is only controllable on Windows, through process creation
//! flags. [`WindowCapability`] is implemented for `tokio::process::Command` with
//! one implementation per OS family:
//!
//! - Windows: `Hidden` sets `CREATE_NO_WINDOW`, `NewConsole` sets `CREATE_NEW_CONSOLE`.
//! - Elsewhere: every mode is a no-op. The dispatcher never asks for `Hidden`
//!   or `NewConsole` semantics it cannot get without also marking the `ProcessSpec` as
//!   `InlineFallback`, so nothing is silently approximated.
//!
//! ## Combined output
//!
//! stdout and stderr are both piped and drained concurrently into one shared
//! buffer, chunk by chunk, in the order the chunks arrive. Callers never see
//! separate streams. The child's stdin is closed (`/dev/null`) so it cannot
//! consume the relay's own request stream.
//!
//! ## Usage
//!
//! ```rust
//! let spec = ProcessSpec::new("bash", ["-c", "echo hi"], WindowMode::Hidden);
//! let execution = process::run_combined(&spec).await;
//! assert_eq!(execution.output, b"hi\n");
//! assert!(execution.error.is_none());
//! ```
//!
use crate::core::error::RelayError;
use std::fmt;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

/// How the child's console window is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// No visible window; output is only captured.
    Hidden,
    /// A fresh, user-visible console window is allocated for the child.
    NewConsole,
    /// A visible window was requested but the host cannot create one; the
    /// command runs inline with captured output instead.
    InlineFallback,
}

// Only the Windows window capability reads the creation flags.
#[cfg_attr(not(windows), allow(dead_code))]
impl WindowMode {
    /// `CREATE_NO_WINDOW`: the console process gets no window.
    pub const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    /// `CREATE_NEW_CONSOLE`: the process gets its own new console window.
    pub const CREATE_NEW_CONSOLE: u32 = 0x0000_0010;

    /// Windows process creation flags for this mode, if any.
    pub fn creation_flags(self) -> Option<u32> {
        match self {
            WindowMode::Hidden => Some(Self::CREATE_NO_WINDOW),
            WindowMode::NewConsole => Some(Self::CREATE_NEW_CONSOLE),
            WindowMode::InlineFallback => None,
        }
    }
}

/// A ready-to-run child process description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub window: WindowMode,
}

impl ProcessSpec {
    pub fn new<I, S>(program: &str, args: I, window: WindowMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            window,
        }
    }

    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<&str> {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect()
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.argv())
    }
}

/// Applies a [`WindowMode`] to an OS command, as far as the host supports it.
pub trait WindowCapability {
    fn apply_window_mode(&mut self, mode: WindowMode) -> &mut Self;
}

impl WindowCapability for Command {
    #[cfg(windows)]
    fn apply_window_mode(&mut self, mode: WindowMode) -> &mut Self {
        if let Some(flags) = mode.creation_flags() {
            self.creation_flags(flags);
        }
        self
    }

    #[cfg(not(windows))]
    fn apply_window_mode(&mut self, mode: WindowMode) -> &mut Self {
        tracing::trace!("No window control on this host; ignoring {:?}", mode);
        self
    }
}

/// Result of running one [`ProcessSpec`].
#[derive(Debug)]
pub struct Execution {
    /// stdout and stderr bytes, in arrival order.
    pub output: Vec<u8>,
    /// Spawn, wait, capture or exit-status failure, if any.
    pub error: Option<RelayError>,
    /// Wall-clock time from just before spawn until the child terminated.
    pub duration_ms: u64,
}

/// Spawns `spec`, waits for it and returns its combined output.
///
/// Never fails: every problem is reported through [`Execution::error`]
/// together with whatever output was captured before it happened.
pub async fn run_combined(spec: &ProcessSpec) -> Execution {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .apply_window_mode(spec.window);

    debug!("Spawning {}", spec);
    let start = Instant::now();

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(source) => {
            return Execution {
                output: Vec::new(),
                error: Some(RelayError::Spawn {
                    program: spec.program.clone(),
                    source,
                }),
                duration_ms: elapsed_ms(start),
            };
        }
    };

    let combined = Arc::new(Mutex::new(Vec::new()));
    let readers = [
        child
            .stdout
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&combined)))),
        child
            .stderr
            .take()
            .map(|pipe| tokio::spawn(drain(pipe, Arc::clone(&combined)))),
    ];

    let status = child.wait().await;
    let duration_ms = elapsed_ms(start);

    let mut capture_error = None;
    for reader in readers.into_iter().flatten() {
        let failure = match reader.await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) => Some(e.to_string()),
        };
        if capture_error.is_none() {
            capture_error = failure.map(RelayError::OutputCapture);
        }
    }

    let output = std::mem::take(&mut *combined.lock().await);
    let error = match status {
        Ok(status) => exit_error(status).or(capture_error),
        Err(source) => Some(RelayError::Wait {
            program: spec.program.clone(),
            source,
        }),
    };

    debug!(
        "{} finished in {}ms with {} output bytes",
        spec.program,
        duration_ms,
        output.len()
    );

    Execution {
        output,
        error,
        duration_ms,
    }
}

/// Copies one pipe into the shared buffer until EOF.
async fn drain<R>(mut pipe: R, sink: Arc<Mutex<Vec<u8>>>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; 4096];
    loop {
        let n = pipe.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        sink.lock().await.extend_from_slice(&chunk[..n]);
    }
}

/// Maps a non-success exit status to the error reported to the caller.
fn exit_error(status: ExitStatus) -> Option<RelayError> {
    if status.success() {
        return None;
    }
    if let Some(code) = status.code() {
        return Some(RelayError::NonZeroExit { code });
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(RelayError::Signal { signal });
        }
    }
    Some(RelayError::AbnormalExit)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
