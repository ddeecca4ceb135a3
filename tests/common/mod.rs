use std::path::Path;

/// Build a minimal generation workspace: one source file under `src/` and one
/// template under `tpl/`. Returns the tempdir guard.
#[allow(dead_code)]
pub fn init_workspace() -> tempfile::TempDir {
  let dir = tempfile::TempDir::new().unwrap();

  std::fs::create_dir_all(dir.path().join("src")).unwrap();
  std::fs::create_dir_all(dir.path().join("tpl")).unwrap();

  std::fs::write(dir.path().join("src/user.model"), "User\n  name: String\n").unwrap();
  std::fs::write(
    dir.path().join("tpl/models.rs.tpl"),
    "// module: {{ module }}\n// sources:\n{{ source_files }}\n",
  )
  .unwrap();

  dir
}

/// Write a descriptor with three configuration blocks, each with its own
/// source/template/output trees, all relative to the descriptor's directory.
#[allow(dead_code)]
pub fn write_multi_descriptor(root: &Path) {
  for name in ["alpha", "beta", "gamma"] {
    std::fs::create_dir_all(root.join(name).join("src")).unwrap();
    std::fs::create_dir_all(root.join(name).join("tpl")).unwrap();
    std::fs::write(root.join(name).join("src/thing.model"), "Thing\n").unwrap();
    std::fs::write(
      root.join(name).join("tpl/out.rs.tpl"),
      format!("// block: {}\n", name),
    )
    .unwrap();
  }

  let mut descriptor = String::new();
  for name in ["alpha", "beta", "gamma"] {
    descriptor.push_str(&format!(
      "[[configurations]]\nsources = [\"{n}/src\"]\ntemplates = [\"{n}/tpl\"]\noutput = \"{n}/gen\"\n\n",
      n = name
    ));
  }
  std::fs::write(root.join("tplgen.toml"), descriptor).unwrap();
}
