use std::path::Path;

use thiserror::Error;

/// Terminal failure categories, each pinned to a process exit code.
///
/// Everything that ends the run flows through here so that `main` owns the
/// single `process::exit` call and tests can assert on categories directly.
#[derive(Debug, Error)]
pub enum Fatal {
  /// A declared path is missing, unreadable, or (for output) unwritable.
  #[error("{0}")]
  InvalidPath(String),

  /// Empty sources/templates or a descriptor that fails to parse.
  #[error("{0}")]
  InvalidConfig(String),

  /// Propagated engine/processing failure.
  #[error(transparent)]
  Other(#[from] anyhow::Error),
}

impl Fatal {
  pub fn exit_code(&self) -> i32 {
    match self {
      Fatal::InvalidPath(_) => 1,
      Fatal::InvalidConfig(_) => 2,
      Fatal::Other(_) => 3,
    }
  }

  pub fn unreadable(path: &Path) -> Self {
    Fatal::InvalidPath(format!("'{}' does not exist or is not readable", path.display()))
  }

  pub fn unwritable(path: &Path) -> Self {
    Fatal::InvalidPath(format!("'{}' is not writable", path.display()))
  }
}
