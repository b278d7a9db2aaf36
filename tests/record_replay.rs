//! Cassette replay integration tests — zero network I/O.
//!
//! Every test sets `DREAMGEN_REPLAY` to a cassette written into a temporary
//! directory so the binary never contacts the live API.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;
use serde_json::{json, Value};

/// A 1×1 PNG.
const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

fn cmd() -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("dreamgen");
    cmd.env("DREAMGEN_CONFIG", "/nonexistent/dreamgen/config.toml")
        .env_remove("DREAMGEN_REC")
        .env_remove("RUST_LOG");
    cmd
}

/// Write a one-interaction cassette whose output is `output`.
fn write_cassette(dir: &Path, output: Value) -> PathBuf {
    let cassette = json!({
        "name": "test",
        "recorded_at": "2026-02-01T00:00:00Z",
        "commit": "test",
        "interactions": [{
            "seq": 0,
            "port": "visual_service",
            "method": "cv_process",
            "input": {},
            "output": output,
        }]
    });
    let path = dir.join("test.cassette.yaml");
    std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    path
}

/// Run the binary against a cassette and return (exit code, parsed stdout).
fn run_replay(dir: &Path, output: Value, out_dir: &Path) -> (i32, Value) {
    let cassette = write_cassette(dir, output);
    let assert = cmd()
        .env("DREAMGEN_REPLAY", &cassette)
        .args(["AK", "SK", "a cat"])
        .arg(out_dir)
        .assert();
    let output = assert.get_output();
    let stdout = String::from_utf8(output.stdout.clone()).unwrap();
    assert_eq!(stdout.lines().count(), 1, "exactly one JSON line expected, got: {stdout}");
    (output.status.code().unwrap(), serde_json::from_str(&stdout).unwrap())
}

#[test]
fn empty_response() {
    let dir = tempfile::tempdir().unwrap();
    let (code, report) = run_replay(dir.path(), json!({"Ok": null}), &dir.path().join("out"));

    assert_eq!(code, 1);
    assert_eq!(report, json!({"error": "Empty response from API"}));
}

#[test]
fn textual_response_that_is_not_json() {
    let dir = tempfile::tempdir().unwrap();
    let (code, report) =
        run_replay(dir.path(), json!({"Ok": "<html>gateway</html>"}), &dir.path().join("out"));

    assert_eq!(code, 1);
    assert!(report["error"].is_string());
    assert!(report.get("details").is_none());
}

#[test]
fn api_error_includes_details() {
    let dir = tempfile::tempdir().unwrap();
    let raw = json!({"code": 50000, "message": "bad prompt"});
    let (code, report) = run_replay(dir.path(), json!({"Ok": raw}), &dir.path().join("out"));

    assert_eq!(code, 1);
    assert!(report["error"].as_str().unwrap().contains("bad prompt"));
    assert_eq!(report["details"], raw);
}

#[test]
fn no_image_data() {
    let dir = tempfile::tempdir().unwrap();
    let raw = json!({"code": 10000, "data": {"binary_data_base64": []}});
    let out = dir.path().join("out");
    let (code, report) = run_replay(dir.path(), json!({"Ok": raw}), &out);

    assert_eq!(code, 1);
    assert_eq!(report, json!({"error": "No image data received"}));
    assert!(!out.exists());
}

#[test]
fn success_creates_directory_and_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("does").join("not").join("exist");
    let raw = json!({
        "code": 10000,
        "request_id": "req123",
        "data": {"binary_data_base64": [PNG_B64]}
    });
    let (code, report) = run_replay(dir.path(), json!({"Ok": raw}), &out);

    assert_eq!(code, 0);
    assert_eq!(report["success"], true);
    assert_eq!(report["original_id"], "req123");

    let files: Vec<_> = std::fs::read_dir(&out).unwrap().flatten().collect();
    assert_eq!(files.len(), 1, "exactly one file should be written");
    let name = files[0].file_name().to_string_lossy().into_owned();
    assert_eq!(report["filename"], name.as_str());

    let digits = name.strip_prefix("dream_py_").and_then(|s| s.strip_suffix(".png")).unwrap();
    assert!(!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()), "bad name {name}");

    let bytes = std::fs::read(files[0].path()).unwrap();
    assert_eq!(&bytes[..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    assert_eq!(base64::engine::general_purpose::STANDARD.encode(&bytes), PNG_B64);
}

#[test]
fn success_line_is_python_spaced() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = write_cassette(
        dir.path(),
        json!({"Ok": {"code": 10000, "data": {"binary_data_base64": [PNG_B64]}}}),
    );

    cmd()
        .env("DREAMGEN_REPLAY", &cassette)
        .args(["AK", "SK", "a cat"])
        .arg(dir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r#"^\{"success": true, "original_id": "unknown", "filename": "dream_py_\d+\.png"\}\n$"#,
        )
        .unwrap());
}

#[test]
fn replayed_failure_message_is_reported_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let (code, report) =
        run_replay(dir.path(), json!({"Err": "operation timed out"}), &dir.path().join("out"));

    assert_eq!(code, 1);
    assert_eq!(report, json!({"error": "operation timed out"}));
}

#[test]
fn exhausted_cassette_is_an_error_not_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let cassette = json!({
        "name": "empty",
        "recorded_at": "2026-02-01T00:00:00Z",
        "commit": "test",
        "interactions": []
    });
    let path = dir.path().join("empty.cassette.yaml");
    std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();

    cmd()
        .env("DREAMGEN_REPLAY", &path)
        .args(["AK", "SK", "a cat"])
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Cassette exhausted"));
}

#[test]
fn output_dir_blocked_by_file() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").unwrap();
    let raw = json!({"code": 10000, "data": {"binary_data_base64": [PNG_B64]}});

    let (code, report) = run_replay(dir.path(), json!({"Ok": raw}), &blocker);
    assert_eq!(code, 1);
    assert!(report["error"].is_string());
}
