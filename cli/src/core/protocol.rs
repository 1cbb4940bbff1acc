//! # shellrelay Wire Protocol
//!
//! File: cli/src/core/protocol.rs
//!
//! ## Overview
//!
//! shellrelay speaks newline-delimited JSON: one request object per input line,
//! one response object per output line, in the same order.
//!
//! Request (all fields optional):
//!
//! ```json
//! {"command": "dir", "type": "cmd", "headless": true, "verbose": false, "persist_window": true}
//! ```
//!
//! Response (`error` and `debug` are omitted when absent):
//!
//! ```json
//! {"output": "...", "error": "exit status 1", "duration_ms": 12, "debug": "..."}
//! ```
//!
//! ## Parsing rules
//!
//! - A line that is not a JSON object of the shape above is taken verbatim as a
//!   bare command for the default shell, headless. This keeps plain-text
//!   callers working.
//! - Missing or `null` fields take their defaults: `headless` and
//!   `persist_window` default to `true`, `verbose` to `false`.
//! - Field names are matched case-insensitively (`{"Command": "dir", "Type": "ps"}`
//!   is a PowerShell request). If two keys differ only in case, the all-lowercase
//!   spelling wins.
//! - `type` is matched case-insensitively; unknown values fall back to the
//!   default shell instead of being rejected.
//! - Unknown fields are ignored.
//!
//! ## Batches
//!
//! [`parse_batch`] reads a whole document of requests for `shellrelay batch`:
//! either a JSON array whose items are bare command strings or request objects,
//! or anything else, which is split into lines and parsed like relay input.
//!
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, error};

/// Which interpreter runs a request's command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpreterKind {
    /// `cmd` on Windows, `bash` elsewhere.
    #[default]
    DefaultShell,
    /// Windows PowerShell, or PowerShell Core (`pwsh`) off Windows.
    PowerShell,
    /// `bash` inside the Windows Subsystem for Linux.
    WslBash,
}

impl InterpreterKind {
    /// Resolves a request `type` tag. Never fails: unknown tags mean the default shell.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "powershell" | "ps" => InterpreterKind::PowerShell,
            "wsl" => InterpreterKind::WslBash,
            _ => InterpreterKind::DefaultShell,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            InterpreterKind::DefaultShell => "cmd",
            InterpreterKind::PowerShell => "powershell",
            InterpreterKind::WslBash => "wsl",
        }
    }
}

impl fmt::Display for InterpreterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fully-resolved execution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: String,
    pub kind: InterpreterKind,
    /// Run hidden (`true`) or in a new visible console window (`false`).
    pub headless: bool,
    /// Attach a debug trace to the response.
    pub verbose: bool,
    /// Headed mode only: keep the new window open after the command finishes.
    pub persist_window: bool,
}

impl Request {
    /// A request carrying only command text, with every setting at its default.
    pub fn bare(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            kind: InterpreterKind::DefaultShell,
            headless: true,
            verbose: false,
            persist_window: true,
        }
    }
}

/// The request object as it appears on the wire, before defaults are applied.
#[derive(Debug, Deserialize)]
struct WireRequest {
    command: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    headless: Option<bool>,
    verbose: Option<bool>,
    persist_window: Option<bool>,
}

impl From<WireRequest> for Request {
    fn from(wire: WireRequest) -> Self {
        Self {
            command: wire.command.unwrap_or_default(),
            kind: wire
                .kind
                .as_deref()
                .map(InterpreterKind::from_tag)
                .unwrap_or_default(),
            headless: wire.headless.unwrap_or(true),
            verbose: wire.verbose.unwrap_or(false),
            persist_window: wire.persist_window.unwrap_or(true),
        }
    }
}

/// Parses one input line into a [`Request`], falling back to a bare command.
pub fn parse_line(line: &str) -> Request {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => request_from_value(value).unwrap_or_else(|| Request::bare(line)),
        Err(e) => {
            debug!("Input is not JSON ({}); treating it as a bare command", e);
            Request::bare(line)
        }
    }
}

/// Parses a batch document into requests, in document order.
///
/// A top-level JSON array maps item by item: strings are bare commands,
/// request objects are parsed as on the wire, and any other item becomes a
/// bare command of its JSON text. Everything else is read line by line with
/// [`parse_line`], skipping blank lines.
pub fn parse_batch(text: &str) -> Vec<Request> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text) {
        debug!("Batch is a JSON array of {} item(s)", items.len());
        return items
            .into_iter()
            .map(|item| match item {
                Value::String(command) => Request::bare(command),
                other => {
                    let raw = other.to_string();
                    request_from_value(other).unwrap_or_else(|| Request::bare(raw))
                }
            })
            .collect();
    }

    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

/// Builds a request from a decoded JSON value, or `None` if it is not a
/// well-formed request object.
fn request_from_value(value: Value) -> Option<Request> {
    let Value::Object(fields) = value else {
        debug!("Input is JSON but not an object; treating it as a bare command");
        return None;
    };

    // Lowercase spellings go last so they overwrite mixed-case duplicates.
    let (lower, mixed): (Vec<_>, Vec<_>) = fields
        .into_iter()
        .partition(|(key, _)| !key.chars().any(|c| c.is_ascii_uppercase()));
    let folded: Map<String, Value> = mixed
        .into_iter()
        .chain(lower)
        .map(|(key, v)| (key.to_ascii_lowercase(), v))
        .collect();

    match serde_json::from_value::<WireRequest>(Value::Object(folded)) {
        Ok(wire) => Some(wire.into()),
        Err(e) => {
            debug!("Malformed request object ({}); treating it as a bare command", e);
            None
        }
    }
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Combined stdout+stderr, decoded and trimmed.
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

impl Response {
    /// True when the command ran and exited cleanly. An empty `error` counts
    /// as no error.
    pub fn success(&self) -> bool {
        self.error.as_deref().map_or(true, str::is_empty)
    }
}

/// Serializes a response to a single JSON line (without the trailing newline).
///
/// Serialization of these plain string/integer fields cannot realistically
/// fail, but if it ever does the caller still gets a well-formed line that
/// reports the failure, so every request keeps exactly one response.
pub fn encode_response(response: &Response) -> String {
    match serde_json::to_string(response) {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            serde_json::json!({
                "output": "",
                "error": format!("failed to serialize response: {}", e),
                "duration_ms": response.duration_ms,
            })
            .to_string()
        }
    }
}
