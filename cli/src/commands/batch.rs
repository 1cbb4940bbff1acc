//! # shellrelay Batch Execution (`shellrelay batch`)
//!
//! File: cli/src/commands/batch.rs
//!
//! ## Overview
//!
//! Runs a prepared list of requests from a file and prints one response line
//! per request, in file order. The file is either:
//!
//! - a JSON array whose items are bare command strings or request objects
//!   (`["echo one", {"command": "Get-Date", "type": "ps"}]`), or
//! - newline-delimited requests, exactly like relay input.
//!
//! Requests run one after another through the same dispatcher as the relay
//! loop. With `--stop-on-error` the batch ends after the first response that
//! carries an `error`; that response is still printed.
//!
//! A failed command does not fail the process. The exit status only reflects
//! whether the file could be read and the responses written.
//!
//! ## Usage
//!
//! ```bash
//! shellrelay batch requests.json
//! shellrelay batch --stop-on-error deploy-steps.ndjson
//! ```
//!
use crate::{
    commands::serve::write_response,
    common::{dispatch, system::HostOs},
    core::{
        config::RelayConfig,
        error::Result,
        protocol::{self, Request},
    },
};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::AsyncWrite;
use tracing::{debug, info, warn};

/// # Batch Arguments (`BatchArgs`)
///
/// Defines the command-line arguments accepted by the `shellrelay batch` subcommand.
#[derive(Parser, Debug)]
#[command(
    about = "Run every request in a file and print their responses",
    long_about = "Reads a JSON array of requests (strings or request objects) or a file of \
                  newline-delimited requests, runs them in order, and prints one JSON response \
                  line per request to stdout."
)]
pub struct BatchArgs {
    /// File holding the requests.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Stop after the first request whose response carries an error.
    #[arg(long)]
    stop_on_error: bool,
}

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Requests that were executed (and answered).
    pub executed: usize,
    /// Executed requests whose response carries an error.
    pub failed: usize,
    /// Requests left unexecuted because of `--stop-on-error`.
    pub skipped: usize,
}

/// Handles `shellrelay batch`: loads the file, runs it, prints the responses.
pub async fn handle_batch(args: BatchArgs, cfg: &RelayConfig) -> Result<()> {
    debug!("Batch args: {:?}", args);

    let raw = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read batch file '{}'", args.file.display()))?;
    let requests = protocol::parse_batch(&String::from_utf8_lossy(&raw));
    info!(
        "Running {} request(s) from '{}' on host '{}'",
        requests.len(),
        args.file.display(),
        cfg.host_os
    );

    let mut stdout = tokio::io::stdout();
    let summary = run_batch(&requests, &mut stdout, cfg.host_os, args.stop_on_error).await?;

    if summary.skipped > 0 {
        warn!(
            "Stopped on error: {} request(s) not executed",
            summary.skipped
        );
    }
    info!(
        "Batch finished: {} executed, {} failed",
        summary.executed, summary.failed
    );
    Ok(())
}

/// Executes `requests` in order, writing each response to `writer` as soon as
/// it is ready.
pub async fn run_batch<W>(
    requests: &[Request],
    writer: &mut W,
    host: HostOs,
    stop_on_error: bool,
) -> Result<BatchSummary>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = BatchSummary::default();

    for (index, request) in requests.iter().enumerate() {
        debug!("Batch request #{}: {:?}", index + 1, request);
        let response = dispatch::execute(request, host).await;
        write_response(writer, &response).await?;

        summary.executed += 1;
        if !response.success() {
            summary.failed += 1;
            if stop_on_error {
                summary.skipped = requests.len() - summary.executed;
                break;
            }
        }
    }

    Ok(summary)
}
