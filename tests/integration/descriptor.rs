use assert_cmd::Command;

use crate::common;

#[test]
fn three_blocks_generate_three_outputs_relative_to_descriptor() {
  let ws = tempfile::TempDir::new().unwrap();
  common::write_multi_descriptor(ws.path());

  // Run from an unrelated cwd; paths must resolve against the descriptor dir.
  let elsewhere = tempfile::TempDir::new().unwrap();
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(elsewhere.path())
    .args(["--config", ws.path().to_str().unwrap()])
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

  for name in ["alpha", "beta", "gamma"] {
    let artifact = ws.path().join(name).join("gen/out.rs");
    let content = std::fs::read_to_string(&artifact).unwrap();
    assert!(content.contains(&format!("// block: {}", name)));
  }
}

#[test]
fn descriptor_ignores_generation_flags_and_warns() {
  let ws = tempfile::TempDir::new().unwrap();
  common::write_multi_descriptor(ws.path());

  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .args([
      "--config",
      ws.path().to_str().unwrap(),
      "--sources",
      "/nonexistent-flag-source",
      "--templates",
      "/nonexistent-flag-template",
      "--output",
      "flag-gen",
    ])
    .output()
    .unwrap();
  // Flag paths do not exist; success proves the descriptor won.
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert!(String::from_utf8_lossy(&out.stderr).contains("ignored"));
  assert!(!ws.path().join("flag-gen").exists());
  assert!(ws.path().join("alpha/gen/out.rs").exists());
}

#[test]
fn default_descriptor_is_picked_up_from_config_directory() {
  let ws = tempfile::TempDir::new().unwrap();
  common::write_multi_descriptor(ws.path());

  // --config defaults to cwd; the conventional filename is appended.
  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd.current_dir(ws.path()).output().unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert!(ws.path().join("beta/gen/out.rs").exists());
}

#[test]
fn malformed_descriptor_exits_2_before_any_generation() {
  let ws = common::init_workspace();
  std::fs::write(ws.path().join("tplgen.toml"), "configurations = \"not an array\"").unwrap();

  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .args(["--sources", "src", "--templates", "tpl", "--output", "gen"])
    .output()
    .unwrap();
  assert_eq!(out.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&out.stderr).contains("tplgen.toml"));
  // The engine never ran: no output directory was created.
  assert!(!ws.path().join("gen").exists());
}

#[test]
fn environment_variables_interpolate_into_the_descriptor() {
  let ws = common::init_workspace();
  std::fs::write(
    ws.path().join("tplgen.toml"),
    "sources = [\"${TPLGEN_TEST_SRC}\"]\ntemplates = [\"tpl\"]\noutput = \"gen\"\n",
  )
  .unwrap();

  let mut cmd = Command::cargo_bin("tplgen").unwrap();
  let out = cmd
    .current_dir(ws.path())
    .env("TPLGEN_TEST_SRC", "src")
    .output()
    .unwrap();
  assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
  assert!(ws.path().join("gen/models.rs").exists());
}
