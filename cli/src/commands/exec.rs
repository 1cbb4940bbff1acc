//! # shellrelay One-Shot Execution (`shellrelay exec`)
//!
//! File: cli/src/commands/exec.rs
//!
//! ## Overview
//!
//! Runs a single request built from command-line arguments through the same
//! dispatcher and normalizer as the relay loop, and prints its response line.
//! Handy for checking how a command will be dispatched on a host without
//! hand-writing JSON.
//!
//! The process exits successfully whenever a response was produced; a failed
//! command is reported in the response's `error` field, exactly as in the relay.
//!
//! ## Usage
//!
//! ```bash
//! shellrelay exec -- echo hello
//! shellrelay exec --type ps --trace -- Get-Date
//! shellrelay exec --type wsl --headed --no-persist -- uname -a
//! ```
//!
use crate::{
    common::dispatch,
    core::{
        config::RelayConfig,
        error::Result,
        protocol::{self, InterpreterKind, Request},
    },
};
use clap::Parser;
use tracing::{debug, info};

/// # Exec Arguments (`ExecArgs`)
///
/// Defines the command-line arguments accepted by the `shellrelay exec` subcommand.
#[derive(Parser, Debug)]
#[command(
    about = "Run one command through the relay pipeline and print its response",
    long_about = "Builds a single request from the arguments, executes it exactly like the relay loop would, \
                  and prints the JSON response line to stdout."
)]
pub struct ExecArgs {
    /// Interpreter: `cmd` (default shell), `powershell`/`ps`, or `wsl`.
    /// Unknown values fall back to the default shell.
    #[arg(long = "type", short = 't', default_value = "cmd")]
    kind: String,

    /// Run in a new visible console window instead of hidden.
    #[arg(long)]
    headed: bool,

    /// Headed mode only: close the window when the command finishes.
    #[arg(long)]
    no_persist: bool,

    /// Attach the debug trace to the response.
    #[arg(long)]
    trace: bool,

    /// The command text. Words are joined with single spaces.
    #[arg(required = true, last = true)]
    command: Vec<String>,
}

impl ExecArgs {
    fn to_request(&self) -> Request {
        Request {
            command: self.command.join(" "),
            kind: InterpreterKind::from_tag(&self.kind),
            headless: !self.headed,
            verbose: self.trace,
            persist_window: !self.no_persist,
        }
    }
}

/// Handles `shellrelay exec`: executes one request and prints its response.
pub async fn handle_exec(args: ExecArgs, cfg: &RelayConfig) -> Result<()> {
    debug!("Exec args: {:?}", args);

    let request = args.to_request();
    info!("Executing one-shot request on host '{}'", cfg.host_os);

    let response = dispatch::execute(&request, cfg.host_os).await;
    println!("{}", protocol::encode_response(&response));
    Ok(())
}
