//! # shellrelay Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks of the execution pipeline, used by both the relay
//! loop and the one-shot `exec` command.
//!
//! ## Architecture
//!
//! - **`system`**: Host platform identity (`HostOs`).
//! - **`dispatch`**: Maps a request and host to a `ProcessSpec`, runs it and
//!   assembles the response.
//! - **`process`**: Window capability per OS, child spawning and combined
//!   stdout+stderr capture.
//! - **`encoding`**: UTF-16 detection and decoding of captured output.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::{dispatch, system::HostOs};
//! use crate::core::protocol::Request;
//!
//! # async fn run_example() {
//! let response = dispatch::execute(&Request::bare("echo hi"), HostOs::detect()).await;
//! # }
//! ```
//!

/// Request-to-process dispatch and response assembly.
pub mod dispatch;
/// Output decoding (UTF-16 detection and conversion).
pub mod encoding;
/// Process creation, window capability and combined output capture.
pub mod process;
/// Host operating system identity.
pub mod system;
