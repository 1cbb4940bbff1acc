//! # shellrelay Relay Loop (`shellrelay serve`)
//!
//! File: cli/src/commands/serve.rs
//!
//! ## Overview
//!
//! The default mode of the binary. Reads newline-delimited requests from stdin
//! and writes exactly one newline-delimited response per non-empty line to
//! stdout, in input order.
//!
//! ## Architecture
//!
//! Strictly sequential: a line is read, dispatched, executed, normalized,
//! written and flushed before the next line is read. A long-running command
//! therefore stalls every request queued behind it; there is no timeout.
//!
//! The loop itself ([`relay`]) is generic over any `AsyncBufRead`/`AsyncWrite`
//! pair so it can be driven from in-memory buffers in tests. Only
//! [`handle_serve`] touches the real stdin/stdout.
//!
//! Per-request failures live inside the responses. The loop ends on
//! end-of-input, or with an error if reading stdin or writing stdout fails.
//!
//! ## Usage
//!
//! ```bash
//! printf '%s\n' '{"command":"echo hello"}' 'echo plain' | shellrelay
//! # {"output":"hello","duration_ms":2}
//! # {"output":"plain","duration_ms":1}
//! ```
//!
use crate::{
    common::{dispatch, system::HostOs},
    core::{
        config::RelayConfig,
        error::{RelayError, Result},
        protocol::{self, Response},
    },
};
use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

/// Runs the relay on the process's stdin and stdout until end-of-input.
pub async fn handle_serve(cfg: &RelayConfig) -> Result<()> {
    info!(
        "Relay started (host: {}, log level: {})",
        cfg.host_os, cfg.log_level
    );

    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    let handled = relay(stdin, stdout, cfg.host_os).await?;

    info!("End of input reached after {} request(s)", handled);
    Ok(())
}

/// Processes request lines from `reader` until EOF, writing responses to `writer`.
///
/// ## Returns
///
/// * `Result<u64>` - The number of requests answered.
pub async fn relay<R, W>(mut reader: R, mut writer: W, host: HostOs) -> Result<u64>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut handled = 0u64;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        let read = reader
            .read_until(b'\n', &mut raw)
            .await
            .map_err(RelayError::RelayIo)
            .context("Failed to read request line")?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches('\n').trim_end_matches('\r');
        if line.is_empty() {
            continue;
        }

        let request = protocol::parse_line(line);
        debug!("Request #{}: {:?}", handled + 1, request);

        let response = dispatch::execute(&request, host).await;

        write_response(&mut writer, &response).await?;
        handled += 1;
    }

    Ok(handled)
}

/// Writes one response line and flushes it, so the caller sees it immediately.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut encoded = protocol::encode_response(response);
    encoded.push('\n');
    writer
        .write_all(encoded.as_bytes())
        .await
        .map_err(RelayError::RelayIo)
        .context("Failed to write response line")?;
    writer
        .flush()
        .await
        .map_err(RelayError::RelayIo)
        .context("Failed to flush response line")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(input: &str) -> (u64, Vec<Response>) {
        let mut out = Vec::new();
        let handled = relay(input.as_bytes(), &mut out, HostOs::detect())
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let responses = text
            .lines()
            .map(|l| serde_json::from_str::<Response>(l).unwrap())
            .collect();
        (handled, responses)
    }

    #[tokio::test]
    async fn test_empty_input_produces_nothing() {
        let (handled, responses) = run("").await;
        assert_eq!(handled, 0);
        assert!(responses.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_one_response_per_non_empty_line_in_order() {
        let input = "echo one\n\n{\"command\":\"echo two\"}\r\n\r\necho three";
        let (handled, responses) = run(input).await;
        assert_eq!(handled, 3);
        let outputs: Vec<_> = responses.iter().map(|r| r.output.as_str()).collect();
        assert_eq!(outputs, vec!["one", "two", "three"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_bare_line_matches_explicit_request() {
        let (_, responses) = run(
            "echo hi\n{\"command\":\"echo hi\",\"type\":\"cmd\",\"headless\":true}\n",
        )
        .await;
        assert_eq!(responses[0].output, responses[1].output);
        assert_eq!(responses[0].error, responses[1].error);
        assert_eq!(responses[0].debug, responses[1].debug);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failure_does_not_stop_the_loop() {
        let (handled, responses) = run("exit 1\necho after\n").await;
        assert_eq!(handled, 2);
        assert_eq!(responses[0].error.as_deref(), Some("exit status 1"));
        assert_eq!(responses[1].output, "after");
        assert!(responses[1].error.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_invalid_utf8_line_still_answered() {
        let mut input = b"echo ok ".to_vec();
        input.push(0xFF);
        input.push(b'\n');
        let mut out = Vec::new();
        let handled = relay(&input[..], &mut out, HostOs::detect()).await.unwrap();
        assert_eq!(handled, 1);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 1);
    }
}
