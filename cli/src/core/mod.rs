//! # shellrelay Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the core infrastructure components shared by the
//! relay commands: runtime configuration, error types, the wire protocol and
//! the per-request debug trace.
//!
//! ## Architecture
//!
//! - `config`: Runtime settings resolved from the command line
//! - `error`: Error types and the crate-wide `Result` alias
//! - `protocol`: `Request`/`Response` types, line parsing and response encoding
//! - `trace`: The opt-in debug trace attached to verbose responses
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config::RelayConfig;
//! use crate::core::error::{RelayError, Result};
//! use crate::core::protocol::{parse_line, Request, Response};
//! use crate::core::trace::DebugTrace;
//! ```
//!
pub mod config;
pub mod error;
pub mod protocol;
pub mod trace;
