//! # shellrelay Runtime Configuration
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! shellrelay deliberately has no configuration files and no behavior driven
//! by environment variables: every request carries its own settings. What is
//! left to configure is the process itself, and that comes from the command
//! line only:
//!
//! - the diagnostic log level (`-v` count, overridable with `RUST_LOG`)
//! - the host platform used for dispatch (`--host-os`, defaults to detection)
//!
//! ## Architecture
//!
//! `main` parses the CLI with `clap`, then calls [`RelayConfig::from_cli`] which
//! resolves and validates the raw values into a `RelayConfig`. The config is
//! built once and passed by reference to the command handlers.
//!
//! ## Examples
//!
//! ```rust
//! let cfg = RelayConfig::from_cli(2, Some("windows"))?;
//! assert_eq!(cfg.log_level, "debug");
//! assert_eq!(cfg.host_os, HostOs::Windows);
//! ```
//!
use crate::common::system::HostOs;
use crate::core::error::Result;
use anyhow::Context;
use tracing::{debug, warn};

/// Effective process-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is not set.
    pub log_level: &'static str,
    /// Platform the dispatcher builds process specs for.
    pub host_os: HostOs,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            log_level: log_level_for(0),
            host_os: HostOs::detect(),
        }
    }
}

impl RelayConfig {
    /// Resolves raw CLI values into a validated configuration.
    ///
    /// ## Arguments
    ///
    /// * `verbosity` - Number of `-v` flags given.
    /// * `host_os` - Optional `--host-os` override tag.
    ///
    /// ## Returns
    ///
    /// * `Result<RelayConfig>` - Fails only when the host override is not a known tag.
    pub fn from_cli(verbosity: u8, host_os: Option<&str>) -> Result<Self> {
        let detected = HostOs::detect();
        let host_os = match host_os {
            Some(tag) => tag
                .parse::<HostOs>()
                .with_context(|| format!("Invalid --host-os value '{}'", tag))?,
            None => detected,
        };

        let cfg = Self {
            log_level: log_level_for(verbosity),
            host_os,
        };
        cfg.validate();
        Ok(cfg)
    }

    /// Logs settings that are valid but probably not what the operator wants.
    fn validate(&self) {
        let detected = HostOs::detect();
        if self.host_os != detected {
            warn!(
                "Dispatching for host '{}' while running on '{}'; interpreters may not resolve",
                self.host_os, detected
            );
        }
        debug!("Effective relay configuration: {:?}", self);
    }
}

/// Maps the `-v` count to a `tracing` level directive.
pub fn log_level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
