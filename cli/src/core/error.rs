//! # shellrelay Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout shellrelay. Two layers
//! exist, mirroring how failures are handled by the relay:
//!
//! - **Per-request failures** (spawn failure, non-zero exit, a signal kill)
//!   are `RelayError` values that get rendered into `Response.error`. They are
//!   never propagated past the dispatcher and never stop the relay loop.
//! - **Process-level failures** (stdin/stdout broken, invalid CLI input) are
//!   propagated as `anyhow::Error` up to `main`, which reports them on stderr
//!   and exits with status 1.
//!
//! ## Architecture
//!
//! - `RelayError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! ## Examples
//!
//! ```rust
//! // A non-zero exit becomes the response's error text.
//! let err = RelayError::NonZeroExit { code: 1 };
//! assert_eq!(err.to_string(), "exit status 1");
//!
//! // Add context to process-level errors using anyhow
//! writer.flush().await.context("Failed to flush response line")?;
//! ```
//!
use thiserror::Error;

/// Custom error type for shellrelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The interpreter could not be started (missing binary, permissions, ...).
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child started but waiting on it failed.
    #[error("failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child terminated normally with a non-zero status.
    #[error("exit status {code}")]
    NonZeroExit { code: i32 },

    /// The child was killed by a signal (unix only).
    #[error("terminated by signal {signal}")]
    Signal { signal: i32 },

    /// The child terminated without a code or a signal.
    #[error("process terminated abnormally")]
    AbnormalExit,

    /// Reading one of the child's output pipes failed.
    #[error("failed to capture output: {0}")]
    OutputCapture(String),

    /// `--host-os` was given a value that is not a known platform tag.
    #[error("unknown host OS '{0}' (expected windows, linux, macos or other)")]
    UnknownHostOs(String),

    /// Reading requests or writing responses failed.
    #[error("relay I/O failed: {0}")]
    RelayIo(#[from] std::io::Error),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
/// Anyhow allows for easy context addition and flexible error handling.
pub type Result<T> = anyhow::Result<T>;
