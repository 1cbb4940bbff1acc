//! # shellrelay Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration test files (`main_tests.rs`, `relay.rs`,
//! `exec.rs`). Each `.rs` file in `cli/tests/` is compiled as its own test
//! crate and runs the compiled `shellrelay` binary.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use serde_json::Value;

/// # Get shellrelay Command (`relay_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `shellrelay` binary.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn relay_cmd() -> Command {
    Command::cargo_bin("shellrelay").expect("Failed to find shellrelay binary for testing")
}

/// Feeds `input` to the relay loop and returns the parsed response lines.
pub fn relay_responses(input: &str) -> Vec<Value> {
    let output = relay_cmd()
        .write_stdin(input)
        .output()
        .expect("Failed to run shellrelay");
    assert!(
        output.status.success(),
        "relay exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .expect("relay stdout must be UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each stdout line must be JSON"))
        .collect()
}
