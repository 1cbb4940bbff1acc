//! # shellrelay Per-Request Debug Trace
//!
//! File: cli/src/core/trace.rs
//!
//! ## Overview
//!
//! A request with `"verbose": true` gets a human-readable trace of what the
//! relay did with it (resolved interpreter, window mode, argument list,
//! encoding decision, failure text, timing) in `Response.debug`.
//!
//! The trace is separate from the process-wide `tracing` logs: logs go to
//! stderr for the operator, the trace travels back to the caller inside the
//! response.
//!
//! A disabled trace holds no buffer, and [`DebugTrace::note`] takes a closure
//! so that the message is never even formatted unless the trace is enabled.
//!
//! ## Usage
//!
//! ```rust
//! let mut trace = DebugTrace::new(request.verbose);
//! trace.note(|| format!("Executing command: {}", request.command));
//! let debug: Option<String> = trace.finish();
//! ```
//!

/// Line-oriented trace buffer, present only for verbose requests.
#[derive(Debug, Default)]
pub struct DebugTrace {
    buf: Option<String>,
}

impl DebugTrace {
    /// Creates an enabled trace when `verbose` is set, a no-op one otherwise.
    pub fn new(verbose: bool) -> Self {
        Self {
            buf: verbose.then(String::new),
        }
    }

    /// Appends one line. `message` is only evaluated when the trace is enabled.
    pub fn note<F>(&mut self, message: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(buf) = self.buf.as_mut() {
            buf.push_str(&message());
            buf.push('\n');
        }
    }

    /// Consumes the trace, yielding the accumulated text if it was enabled.
    pub fn finish(self) -> Option<String> {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_trace_collects_lines() {
        let mut trace = DebugTrace::new(true);
        trace.note(|| "first".to_string());
        trace.note(|| format!("second {}", 2));
        assert_eq!(trace.finish().as_deref(), Some("first\nsecond 2\n"));
    }

    #[test]
    fn test_disabled_trace_never_formats() {
        let mut trace = DebugTrace::new(false);
        let mut called = false;
        trace.note(|| {
            called = true;
            String::from("unused")
        });
        assert!(!called);
        assert_eq!(trace.finish(), None);
    }
}
