//! # shellrelay Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the top-level commands of the shellrelay CLI and
//! makes them accessible to the main entry point (`main.rs`).
//!
//! ## Commands
//!
//! - `serve`: The NDJSON relay loop over stdin/stdout (also the default when no
//!   subcommand is given)
//! - `exec`: One request built from command-line arguments, for diagnostics
//! - `batch`: Every request in a file (JSON array or NDJSON), run in order
//!
//! All commands share the dispatcher and normalizer in `common`, so a request
//! behaves the same whichever way it enters the process.
//!

/// The stdin/stdout relay loop.
pub mod serve;
/// One-shot execution of a single request.
pub mod exec;
/// Ordered execution of a file of requests.
pub mod batch;
