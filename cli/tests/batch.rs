//! # shellrelay Batch Integration Tests
//!
//! File: cli/tests/batch.rs
//!
//! ## Overview
//!
//! Integration tests for `shellrelay batch`, which runs a file of requests.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn batch_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create batch file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write batch file");
    file
}

fn batch_lines(args: &[&str], file: &NamedTempFile) -> Vec<serde_json::Value> {
    let output = relay_cmd()
        .arg("batch")
        .args(args)
        .arg(file.path())
        .output()
        .expect("Failed to run shellrelay batch");
    assert!(
        output.status.success(),
        "batch exited with {:?}: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout)
        .expect("batch stdout must be UTF-8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("each stdout line must be JSON"))
        .collect()
}

#[test]
fn test_batch_missing_file_fails() {
    relay_cmd()
        .args(["batch", "/nonexistent/shellrelay-batch.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read batch file"));
}

#[test]
fn test_empty_batch_prints_nothing() {
    let file = batch_file("[]");
    relay_cmd()
        .arg("batch")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn test_batch_json_array_of_strings_and_objects() {
    let file = batch_file(r#"["echo one", {"Command": "echo two", "Verbose": true}, "exit 1"]"#);
    let responses = batch_lines(&[], &file);
    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["output"], "one");
    assert_eq!(responses[1]["output"], "two");
    assert!(responses[1]["debug"]
        .as_str()
        .unwrap()
        .contains("Executing command: echo two"));
    assert_eq!(responses[2]["error"], "exit status 1");
}

#[cfg(unix)]
#[test]
fn test_batch_ndjson_file_with_stop_on_error() {
    let file = batch_file("echo first\n{\"command\":\"exit 3\"}\necho skipped\n");
    let responses = batch_lines(&["--stop-on-error"], &file);
    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["output"], "first");
    assert_eq!(responses[1]["error"], "exit status 3");
}
