//! # shellrelay Dispatcher (`common::dispatch`)
//!
//! File: cli/src/common/dispatch.rs
//!
//! ## Overview
//!
//! Turns a [`Request`] into a [`ProcessSpec`], runs it, and assembles the
//! [`Response`]. The `ProcessSpec` is a pure function of three inputs:
//!
//! | kind \ mode     | headless (any host) | headed, Windows                                   | headed, other hosts |
//! |-----------------|---------------------|---------------------------------------------------|---------------------|
//! | default shell   | `cmd /C` / `bash -c`| `cmd /C start cmd /K`                             | `bash -c` (inline)  |
//! | PowerShell      | `powershell -Command` / `pwsh -Command` | `powershell -NoExit -Command` | `pwsh -Command` (inline) |
//! | WSL             | `wsl -- bash -c`    | `cmd /C start wsl -- bash -c "<cmd>; read -p ..."` | `bash -c` (inline)  |
//!
//! Headed Windows windows stay open after the command when `persist_window` is
//! set (the default). With `persist_window = false` they close: no `-NoExit`,
//! `cmd /C` instead of `cmd /K`, and no WSL "press enter" prompt.
//!
//! Hosts without console windows cannot honour headed mode. Those specs carry
//! [`WindowMode::InlineFallback`], which is logged and reported in the debug
//! trace instead of pretending a window was opened.
//!
use crate::common::encoding;
use crate::common::process::{self, Execution, ProcessSpec, WindowMode};
use crate::common::system::HostOs;
use crate::core::protocol::{InterpreterKind, Request, Response};
use crate::core::trace::DebugTrace;
use tracing::{info, warn};

/// Appended to WSL commands in a persistent headed window; WSL has no
/// "keep the window open" switch of its own.
const WSL_HOLD_PROMPT: &str = "; read -p 'Press Enter to close...'";

/// Builds the process specification for `request` on `host`.
pub fn build_spec(request: &Request, host: HostOs) -> ProcessSpec {
    let command = request.command.as_str();

    if request.headless {
        return headless_spec(request.kind, command, host);
    }

    if host.has_console_windows() {
        new_console_spec(request.kind, command, request.persist_window)
    } else {
        inline_fallback_spec(request.kind, command)
    }
}

fn headless_spec(kind: InterpreterKind, command: &str, host: HostOs) -> ProcessSpec {
    let windows = host.has_console_windows();
    match kind {
        InterpreterKind::PowerShell => ProcessSpec::new(
            if windows { "powershell" } else { "pwsh" },
            ["-Command", command],
            WindowMode::Hidden,
        ),
        InterpreterKind::WslBash => {
            ProcessSpec::new("wsl", ["--", "bash", "-c", command], WindowMode::Hidden)
        }
        InterpreterKind::DefaultShell if windows => {
            ProcessSpec::new("cmd", ["/C", command], WindowMode::Hidden)
        }
        InterpreterKind::DefaultShell => {
            ProcessSpec::new("bash", ["-c", command], WindowMode::Hidden)
        }
    }
}

fn new_console_spec(kind: InterpreterKind, command: &str, persist: bool) -> ProcessSpec {
    let args: Vec<String> = match (kind, persist) {
        (InterpreterKind::PowerShell, true) => {
            return ProcessSpec::new(
                "powershell",
                ["-NoExit", "-Command", command],
                WindowMode::NewConsole,
            )
        }
        (InterpreterKind::PowerShell, false) => {
            return ProcessSpec::new("powershell", ["-Command", command], WindowMode::NewConsole)
        }
        (InterpreterKind::WslBash, true) => start_args(
            ["wsl", "--", "bash", "-c"],
            format!("{}{}", command, WSL_HOLD_PROMPT),
        ),
        (InterpreterKind::WslBash, false) => {
            start_args(["wsl", "--", "bash", "-c"], command.to_string())
        }
        (InterpreterKind::DefaultShell, true) => start_args(["cmd", "/K"], command.to_string()),
        (InterpreterKind::DefaultShell, false) => start_args(["cmd", "/C"], command.to_string()),
    };
    ProcessSpec::new("cmd", args, WindowMode::NewConsole)
}

/// `cmd /C start <launcher...> <command>`.
fn start_args<const N: usize>(launcher: [&str; N], command: String) -> Vec<String> {
    ["/C", "start"]
        .into_iter()
        .chain(launcher)
        .map(str::to_string)
        .chain(std::iter::once(command))
        .collect()
}

fn inline_fallback_spec(kind: InterpreterKind, command: &str) -> ProcessSpec {
    match kind {
        InterpreterKind::PowerShell => {
            ProcessSpec::new("pwsh", ["-Command", command], WindowMode::InlineFallback)
        }
        InterpreterKind::WslBash | InterpreterKind::DefaultShell => {
            ProcessSpec::new("bash", ["-c", command], WindowMode::InlineFallback)
        }
    }
}

/// Builds the `ProcessSpec` for `request`, records the dispatch decisions in `trace`
/// and runs it.
pub async fn build_and_run(request: &Request, host: HostOs, trace: &mut DebugTrace) -> Execution {
    let spec = build_spec(request, host);

    match spec.window {
        WindowMode::Hidden => {
            trace.note(|| "Running in headless mode (window hidden)".to_string());
        }
        WindowMode::NewConsole => {
            trace.note(|| "Running in headed mode (new window created)".to_string());
        }
        WindowMode::InlineFallback => {
            warn!(
                "Headed mode requested but '{}' cannot open a new console window; running inline",
                host
            );
            trace.note(|| {
                format!(
                    "Running in headed mode: not supported on {}, no window was created; command runs inline",
                    host
                )
            });
        }
    }
    trace.note(|| format!("Command args: {}", spec));

    process::run_combined(&spec).await
}

/// Executes one request end to end and produces its response.
pub async fn execute(request: &Request, host: HostOs) -> Response {
    let mut trace = DebugTrace::new(request.verbose);
    trace.note(|| format!("Executing command: {}", request.command));
    trace.note(|| {
        format!(
            "Type: {}, Headless: {}, PersistWindow: {}",
            request.kind, request.headless, request.persist_window
        )
    });

    let execution = build_and_run(request, host, &mut trace).await;

    let output = encoding::normalize(&execution.output, &mut trace)
        .trim()
        .to_string();

    let error = execution.error.map(|e| e.to_string());
    if let Some(text) = &error {
        trace.note(|| format!("Command failed with error: {}", text));
    }
    trace.note(|| format!("Execution completed in {}ms", execution.duration_ms));

    info!(
        kind = %request.kind,
        headless = request.headless,
        duration_ms = execution.duration_ms,
        failed = error.is_some(),
        "Request completed"
    );

    Response {
        output,
        error,
        duration_ms: execution.duration_ms,
        debug: trace.finish(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: InterpreterKind, headless: bool) -> Request {
        Request {
            kind,
            headless,
            ..Request::bare("echo hi")
        }
    }

    #[test]
    fn test_headless_windows_specs() {
        let host = HostOs::Windows;
        assert_eq!(
            build_spec(&request(InterpreterKind::DefaultShell, true), host),
            ProcessSpec::new("cmd", ["/C", "echo hi"], WindowMode::Hidden)
        );
        assert_eq!(
            build_spec(&request(InterpreterKind::PowerShell, true), host),
            ProcessSpec::new("powershell", ["-Command", "echo hi"], WindowMode::Hidden)
        );
        assert_eq!(
            build_spec(&request(InterpreterKind::WslBash, true), host),
            ProcessSpec::new("wsl", ["--", "bash", "-c", "echo hi"], WindowMode::Hidden)
        );
    }

    #[test]
    fn test_headless_unix_specs() {
        for host in [HostOs::Linux, HostOs::MacOs, HostOs::Other] {
            assert_eq!(
                build_spec(&request(InterpreterKind::DefaultShell, true), host),
                ProcessSpec::new("bash", ["-c", "echo hi"], WindowMode::Hidden)
            );
            assert_eq!(
                build_spec(&request(InterpreterKind::PowerShell, true), host),
                ProcessSpec::new("pwsh", ["-Command", "echo hi"], WindowMode::Hidden)
            );
            assert_eq!(
                build_spec(&request(InterpreterKind::WslBash, true), host),
                ProcessSpec::new("wsl", ["--", "bash", "-c", "echo hi"], WindowMode::Hidden)
            );
        }
    }

    #[test]
    fn test_headed_windows_persistent_specs() {
        let host = HostOs::Windows;
        assert_eq!(
            build_spec(&request(InterpreterKind::DefaultShell, false), host),
            ProcessSpec::new(
                "cmd",
                ["/C", "start", "cmd", "/K", "echo hi"],
                WindowMode::NewConsole
            )
        );
        assert_eq!(
            build_spec(&request(InterpreterKind::PowerShell, false), host),
            ProcessSpec::new(
                "powershell",
                ["-NoExit", "-Command", "echo hi"],
                WindowMode::NewConsole
            )
        );
        assert_eq!(
            build_spec(&request(InterpreterKind::WslBash, false), host),
            ProcessSpec::new(
                "cmd",
                [
                    "/C",
                    "start",
                    "wsl",
                    "--",
                    "bash",
                    "-c",
                    "echo hi; read -p 'Press Enter to close...'"
                ],
                WindowMode::NewConsole
            )
        );
    }

    #[test]
    fn test_headed_windows_auto_close_specs() {
        let host = HostOs::Windows;
        let auto_close = |kind| Request {
            persist_window: false,
            ..request(kind, false)
        };
        assert_eq!(
            build_spec(&auto_close(InterpreterKind::DefaultShell), host).args,
            vec!["/C", "start", "cmd", "/C", "echo hi"]
        );
        assert_eq!(
            build_spec(&auto_close(InterpreterKind::PowerShell), host).args,
            vec!["-Command", "echo hi"]
        );
        assert_eq!(
            build_spec(&auto_close(InterpreterKind::WslBash), host).args,
            vec!["/C", "start", "wsl", "--", "bash", "-c", "echo hi"]
        );
    }

    #[test]
    fn test_headed_unix_falls_back_inline() {
        let host = HostOs::Linux;
        assert_eq!(
            build_spec(&request(InterpreterKind::PowerShell, false), host),
            ProcessSpec::new("pwsh", ["-Command", "echo hi"], WindowMode::InlineFallback)
        );
        for kind in [InterpreterKind::DefaultShell, InterpreterKind::WslBash] {
            assert_eq!(
                build_spec(&request(kind, false), host),
                ProcessSpec::new("bash", ["-c", "echo hi"], WindowMode::InlineFallback)
            );
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_echo_hello() {
        let resp = execute(&Request::bare("echo hello"), HostOs::detect()).await;
        assert_eq!(resp.output, "hello");
        assert_eq!(resp.error, None);
        assert_eq!(resp.debug, None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_exit_one_reports_error() {
        let resp = execute(&Request::bare("exit 1"), HostOs::detect()).await;
        assert_eq!(resp.error.as_deref(), Some("exit status 1"));
        assert_eq!(resp.output, "");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_verbose_trace() {
        let req = Request {
            verbose: true,
            ..Request::bare("echo traced; exit 2")
        };
        let resp = execute(&req, HostOs::detect()).await;
        let debug = resp.debug.expect("verbose request must carry a trace");
        assert!(debug.contains("Executing command: echo traced; exit 2"));
        assert!(debug.contains("Type: cmd, Headless: true"));
        assert!(debug.contains("Running in headless mode"));
        assert!(debug.contains(r#"Command args: ["bash", "-c", "echo traced; exit 2"]"#));
        assert!(debug.contains("Command failed with error: exit status 2"));
        assert!(debug.contains("Execution completed in"));
        assert_eq!(resp.output, "traced");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_execute_headed_on_unix_reports_gap() {
        let req = Request {
            headless: false,
            verbose: true,
            ..Request::bare("echo inline")
        };
        let resp = execute(&req, HostOs::Linux).await;
        assert_eq!(resp.output, "inline");
        assert!(resp
            .debug
            .unwrap()
            .contains("not supported on linux, no window was created"));
    }

    // `wsl` is not expected on non-Windows test hosts.
    #[cfg(not(windows))]
    #[tokio::test]
    async fn test_execute_missing_interpreter_is_response_error() {
        let req = Request {
            kind: InterpreterKind::WslBash,
            ..Request::bare("echo hi")
        };
        let resp = execute(&req, HostOs::Linux).await;
        assert!(resp.error.unwrap().contains("failed to start 'wsl'"));
        assert_eq!(resp.output, "");
    }
}
