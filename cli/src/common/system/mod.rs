//! # shellrelay System Utilities Module (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Host platform identity. The dispatcher branches on which operating system
//! it is running on (default shell choice, PowerShell binary name, whether a
//! new console window can be created), so the host is modelled as a small
//! closed enum instead of scattering `cfg!` checks through the dispatch table.
//!
//! Detection uses the compile target (`std::env::consts::OS`). The value can be
//! overridden from the command line (`--host-os`) to inspect how requests
//! would be dispatched on another platform.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::system::HostOs;
//!
//! let host = HostOs::detect();
//! if host.has_console_windows() {
//!     // `cmd`, `powershell` and new-console creation flags are available.
//! }
//! ```
//!
use crate::core::error::RelayError;
use std::fmt;
use std::str::FromStr;

/// Operating system the relay runs on, as far as dispatch is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Windows,
    Linux,
    MacOs,
    Other,
}

impl HostOs {
    /// Detects the host from the compile target.
    pub fn detect() -> Self {
        match std::env::consts::OS {
            "windows" => HostOs::Windows,
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            _ => HostOs::Other,
        }
    }

    /// Whether the host has the windowed-console process model
    /// (hidden windows, `CREATE_NEW_CONSOLE`, `cmd start`).
    pub fn has_console_windows(self) -> bool {
        matches!(self, HostOs::Windows)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HostOs::Windows => "windows",
            HostOs::Linux => "linux",
            HostOs::MacOs => "macos",
            HostOs::Other => "other",
        }
    }
}

impl Default for HostOs {
    fn default() -> Self {
        HostOs::detect()
    }
}

impl fmt::Display for HostOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostOs {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(HostOs::Windows),
            "linux" => Ok(HostOs::Linux),
            "macos" | "mac" | "darwin" => Ok(HostOs::MacOs),
            "other" => Ok(HostOs::Other),
            other => Err(RelayError::UnknownHostOs(other.to_string())),
        }
    }
}
