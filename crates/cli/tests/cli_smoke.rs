//! CLI smoke tests for stow.
//!
//! Each test runs the binary against its own temporary store.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated store for one test.
struct TestEnv {
  temp: TempDir,
}

impl TestEnv {
  fn new() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// A `stow` command bound to this environment's store.
  fn stow_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("stow");
    cmd.env("STOWAGE_STORE", self.temp.path().join("store"));
    cmd.env_remove("STOWAGE_LISTEN");
    cmd.env_remove("STOWAGE_SERIALIZER");
    cmd.env_remove("STOWAGE_CONTAINER");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  fn write_file(&self, name: &str, content: &str) -> std::path::PathBuf {
    let path = self.temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Stores `content` and returns the printed store path.
  fn put(&self, content: &str, extra: &[&str]) -> String {
    let file = self.write_file("doc.json", content);
    let out = self
      .stow_cmd()
      .args(["-o", "json", "put"])
      .arg(&file)
      .args(extra)
      .output()
      .unwrap();
    assert!(out.status.success(), "put failed: {}", String::from_utf8_lossy(&out.stderr));
    let parsed: Value = serde_json::from_slice(&out.stdout).unwrap();
    parsed["path"].as_str().unwrap().to_string()
  }
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  TestEnv::new()
    .stow_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  TestEnv::new()
    .stow_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("stow"));
}

// =============================================================================
// Store round trip
// =============================================================================

#[test]
fn put_then_get_round_trips() {
  let env = TestEnv::new();
  let path = env.put(r#"{"name": "matrix", "rows": [[1, 2], [3, 4]]}"#, &[]);
  assert!(path.starts_with("default/"));

  let out = env.stow_cmd().args(["-o", "json", "get", &path]).output().unwrap();
  assert!(out.status.success());
  let parsed: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(parsed["path"], path.as_str());
  assert_eq!(parsed["value"]["rows"][1][0], 3);
}

#[test]
fn put_respects_container_and_codec() {
  let env = TestEnv::new();
  let path = env.put(r#"[1, 2, 3]"#, &["--container", "scratch", "--codec", "cbor"]);
  assert!(path.starts_with("scratch/"));

  env
    .stow_cmd()
    .args(["get", &path, "--codec", "cbor"])
    .assert()
    .success()
    .stdout(predicate::str::contains("3"));

  env.stow_cmd().args(["get", &path, "--codec", "json"]).assert().failure();
}

#[test]
fn put_rejects_invalid_json() {
  let env = TestEnv::new();
  let file = env.write_file("bad.json", "{ not json");

  env
    .stow_cmd()
    .arg("put")
    .arg(&file)
    .assert()
    .failure()
    .stderr(predicate::str::contains("not valid JSON"));
}

#[test]
fn size_reports_bytes() {
  let env = TestEnv::new();
  let path = env.put(r#""abc""#, &[]);

  env
    .stow_cmd()
    .args(["-o", "json", "size", &path])
    .assert()
    .success()
    .stdout(predicate::str::contains(r#""bytes": 5"#));
}

#[test]
fn rm_deletes_and_second_rm_fails() {
  let env = TestEnv::new();
  let path = env.put(r#"{"k": true}"#, &[]);

  env
    .stow_cmd()
    .args(["rm", &path])
    .assert()
    .success()
    .stdout(predicate::str::contains("Removed"));

  env.stow_cmd().args(["get", &path]).assert().failure();
  env.stow_cmd().args(["rm", &path]).assert().failure();
}

#[test]
fn get_of_missing_path_fails() {
  TestEnv::new()
    .stow_cmd()
    .args(["get", "default/nothing-here"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("default/nothing-here"));
}

#[test]
fn invalid_store_path_is_rejected() {
  TestEnv::new()
    .stow_cmd()
    .args(["get", "../escape"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("Invalid store path"));
}

// =============================================================================
// Info
// =============================================================================

#[test]
fn info_reports_runtime() {
  let env = TestEnv::new();
  let out = env.stow_cmd().args(["-o", "json", "info"]).output().unwrap();
  assert!(out.status.success());

  let parsed: Value = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(parsed["setup_runs"], 1);
  assert_eq!(parsed["default_container"], "default");
  assert!(parsed["address"].as_str().unwrap().starts_with("127.0.0.1:"));
  assert!(parsed["fresh_container"].as_str().unwrap().starts_with("container-"));
}

#[test]
fn info_text_output() {
  TestEnv::new()
    .stow_cmd()
    .args(["-v", "info"])
    .assert()
    .success()
    .stdout(predicate::str::contains("Store"))
    .stdout(predicate::str::contains("Setup runs"));
}

#[test]
fn invalid_listen_setting_fails() {
  TestEnv::new()
    .stow_cmd()
    .env("STOWAGE_LISTEN", "nowhere")
    .arg("info")
    .assert()
    .failure()
    .stderr(predicate::str::contains("STOWAGE_LISTEN"));
}

// =============================================================================
// Split
// =============================================================================

#[test]
fn split_by_parts() {
  let out = TestEnv::new()
    .stow_cmd()
    .args(["-o", "json", "split", "--parts", "3", "a", "b", "c", "d", "e", "f", "g"])
    .output()
    .unwrap();
  assert!(out.status.success());

  let parsed: Vec<Vec<String>> = serde_json::from_slice(&out.stdout).unwrap();
  assert_eq!(parsed, vec![vec!["a", "b", "c"], vec!["d", "e"], vec!["f", "g"]]);
}

#[test]
fn split_by_chunk() {
  TestEnv::new()
    .stow_cmd()
    .args(["split", "--chunk", "2", "a", "b", "c"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2 partition(s)"))
    .stdout(predicate::str::contains("1: c"));
}

#[test]
fn split_requires_a_mode() {
  TestEnv::new().stow_cmd().args(["split", "a", "b"]).assert().failure();
}

#[test]
fn split_rejects_zero_parts() {
  TestEnv::new()
    .stow_cmd()
    .args(["split", "--parts", "0", "a"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("partition count"));
}
