use assert_cmd::Command;

use crate::common;

#[test]
fn flags_only_run_generates_artifact() {
  let ws = common::init_workspace();
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .args([
      "--sources",
      "src",
      "--templates",
      "tpl",
      "--output",
      "gen",
      "--args",
      "module=demo",
    ])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  let artifact = ws.path().join("gen/models.rs");
  let content = std::fs::read_to_string(&artifact).unwrap();
  assert!(content.contains("// module: demo"));
  assert!(content.contains("user.model"));
}

#[test]
fn missing_descriptor_logs_fallback_notice() {
  use predicates::prelude::*;
  let ws = common::init_workspace();
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  cmd
    .current_dir(ws.path())
    .args(["--sources", "src", "--templates", "tpl", "--output", "gen"])
    .assert()
    .success()
    .stderr(predicate::str::contains("no descriptor"));
}

#[test]
fn completed_run_reports_elapsed_time_and_exits() {
  let ws = common::init_workspace();
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .args(["--sources", "src", "--templates", "tpl", "--output", "gen"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let err = String::from_utf8_lossy(&out.stderr);
  assert!(err.contains("finished in"), "stderr: {}", err);
}

#[test]
fn quiet_suppresses_informational_logging() {
  let ws = common::init_workspace();
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .args(["--quiet", "--sources", "src", "--templates", "tpl", "--output", "gen"])
    .output()
    .unwrap();
  assert!(out.status.success());
  let err = String::from_utf8_lossy(&out.stderr);
  assert!(!err.contains("finished in"), "stderr: {}", err);
}
