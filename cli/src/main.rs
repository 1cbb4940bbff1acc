//! # shellrelay Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the shellrelay CLI.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the relay loop or the one-shot `exec` command
//!
//! ## Architecture
//!
//! - With no subcommand (or `serve`), the process runs the NDJSON relay loop
//!   on stdin/stdout until end-of-input.
//! - `exec` runs one request built from arguments.
//! - `batch` runs every request in a file and prints the responses.
//! - Diagnostic logs always go to **stderr**. stdout carries nothing but
//!   response lines.
//!
//! ## Examples
//!
//! ```bash
//! # Relay requests from another process
//! some-agent | shellrelay
//!
//! # Same, with info-level logs on stderr
//! shellrelay -v serve
//!
//! # One request, dispatched as PowerShell
//! shellrelay exec --type ps -- Get-ChildItem
//!
//! # A prepared list of requests, stopping at the first failure
//! shellrelay batch --stop-on-error requests.json
//! ```
//!
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands; // Relay loop, one-shot and batch command handlers
mod common; // Dispatch, process execution, output decoding, host detection
mod core; // Core infrastructure (config, errors, protocol, trace)

use crate::core::config::{log_level_for, RelayConfig};

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "shellrelay",
    about = "Line-oriented command relay: NDJSON requests in, NDJSON responses out",
    long_about = "Reads newline-delimited JSON (NDJSON) requests from stdin, one per line, runs each \
                  command through cmd, bash, PowerShell or WSL, and writes one NDJSON response per \
                  line to stdout.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Increase diagnostic logging on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Dispatch as if running on this OS (windows, linux, macos, other).
    #[arg(long, global = true, value_name = "OS")]
    host_os: Option<String>,
}

/// Enum defining all available top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay loop on stdin/stdout (default).
    #[command(alias = "s")]
    Serve,
    #[command(alias = "x")]
    Exec(commands::exec::ExecArgs),
    #[command(alias = "b")]
    Batch(commands::batch::BatchArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level_for(cli.verbose)));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cfg = match RelayConfig::from_cli(cli.verbose, cli.host_os.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(2);
        }
    };

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        None | Some(Commands::Serve) => commands::serve::handle_serve(&cfg).await,
        Some(Commands::Exec(args)) => commands::exec::handle_exec(args, &cfg).await,
        Some(Commands::Batch(args)) => commands::batch::handle_batch(args, &cfg).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
