use std::fs;
use std::path::Path;

use crate::config::Configuration;
use crate::error::Fatal;

/// True when `path` exists and its contents can actually be opened — files are
/// opened for reading, directories are listed.
pub fn is_readable(path: &Path) -> bool {
  match fs::metadata(path) {
    Ok(meta) if meta.is_dir() => fs::read_dir(path).is_ok(),
    Ok(_) => fs::File::open(path).is_ok(),
    Err(_) => false,
  }
}

/// True when `path` either does not exist yet (the engine may create it) or
/// exists without a read-only permission bit.
pub fn is_writable_if_exists(path: &Path) -> bool {
  match fs::metadata(path) {
    Ok(meta) => !meta.permissions().readonly(),
    Err(_) => true,
  }
}

/// Eager filesystem precondition checks for one configuration.
///
/// Check order is fixed — it decides which message a user sees first:
/// 1. sources declared at all
/// 2. every declared source path readable
/// 3. every declared template path readable
/// 4. templates declared at all
/// 5. output writable when it already exists
pub fn validate(cfg: &Configuration) -> Result<(), Fatal> {
  if cfg.sources.is_empty() {
    return Err(Fatal::InvalidConfig("No sources provided".into()));
  }
  for path in cfg.sources.all_paths() {
    if !is_readable(path) {
      return Err(Fatal::unreadable(path));
    }
  }
  for path in cfg.templates.all_paths() {
    if !is_readable(path) {
      return Err(Fatal::unreadable(path));
    }
  }
  if cfg.templates.is_empty() {
    return Err(Fatal::InvalidConfig("No templates provided".into()));
  }
  if !cfg.output.as_os_str().is_empty() && !is_writable_if_exists(&cfg.output) {
    return Err(Fatal::unwritable(&cfg.output));
  }
  Ok(())
}
