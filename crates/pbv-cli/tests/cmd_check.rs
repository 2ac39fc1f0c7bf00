//! Integration tests for `pbv check`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::Command;

/// Path to the compiled `pbv` binary.
fn pbv_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    // current_exe is something like .../deps/cmd_check-<hash>
    // The binary lives in the parent directory.
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("pbv");
    path
}

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(contents.as_bytes()).expect("write");
    f
}

fn schema_with_gte_rule() -> String {
    serde_json::json!({
            "files": [{
                    "path": "envelope.proto",
                    "package": "pkg",
                    "messages": [{
                            "name": "Envelope",
                            "fields": [{
                                    "name": "version",
                                    "field_type": {"Scalar": "U32"},
                                    "cardinality": "SingleRequired",
                                    "storage_mode": "InlineFixed",
                                    "rules": {"rules": [{"kind": "Gte", "payload": {"I64": 1}}]}
                            }]
                    }]
            }]
    })
    .to_string()
}

#[test]
fn check_conforming_payload_exits_0() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args(["check", schema_file.path().to_str().expect("path"), payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .output()
    .expect("run pbv check");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn check_rejected_payload_exits_1() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 0}"#);

    let out = Command::new(pbv_bin())
    .args(["check", schema_file.path().to_str().expect("path"), payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .output()
    .expect("run pbv check");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("version"), "stderr: {stderr}");
}

#[test]
fn check_unknown_message_exits_2() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args(["check", schema_file.path().to_str().expect("path"), payload_file.path().to_str().expect("path"), "--message", "NoSuchMessage"])
    .output()
    .expect("run pbv check");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn check_malformed_schema_json_exits_2() {
    let schema_file = write_temp("not-valid-json");
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args(["check", schema_file.path().to_str().expect("path"), payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .output()
    .expect("run pbv check");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn check_nonexistent_schema_file_exits_2() {
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args(["check", "/no/such/file/ever.json", payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .output()
    .expect("run pbv check");
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn check_quiet_suppresses_accepted_banner() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args([
            "check",
            schema_file.path().to_str().expect("path"),
            payload_file.path().to_str().expect("path"),
            "--message",
            "Envelope",
            "--quiet",
    ])
    .output()
    .expect("run pbv check --quiet");
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stderr.is_empty(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn check_json_format_emits_ndjson_violation_on_stderr() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 0}"#);

    let out = Command::new(pbv_bin())
    .args([
            "check",
            schema_file.path().to_str().expect("path"),
            payload_file.path().to_str().expect("path"),
            "--message",
            "Envelope",
            "-f",
            "json",
    ])
    .output()
    .expect("run pbv check -f json");
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    let first_line = stderr.lines().next().expect("at least one line on stderr");
    let parsed: serde_json::Value = serde_json::from_str(first_line).expect("first stderr line should be valid JSON");
    assert!(parsed.get("constraint_id").is_some(), "missing constraint_id field: {parsed}");
    assert!(parsed.get("field_path").is_some(), "missing field_path field: {parsed}");
}

#[test]
fn check_reads_schema_from_stdin() {
    let payload_file = write_temp(r#"{"version": 5}"#);

    let mut child = Command::new(pbv_bin())
    .args(["check", "-", payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .stdin(std::process::Stdio::piped())
    .stdout(std::process::Stdio::piped())
    .stderr(std::process::Stdio::piped())
    .spawn()
    .expect("spawn pbv check -");
    child.stdin.as_mut().expect("stdin").write_all(schema_with_gte_rule().as_bytes()).expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn check_produces_no_stdout() {
    let schema_file = write_temp(&schema_with_gte_rule());
    let payload_file = write_temp(r#"{"version": 5}"#);

    let out = Command::new(pbv_bin())
    .args(["check", schema_file.path().to_str().expect("path"), payload_file.path().to_str().expect("path"), "--message", "Envelope"])
    .output()
    .expect("run pbv check");
    assert!(out.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&out.stdout));
}
