use log::info;

use crate::config::Configuration;
use crate::error::Fatal;
use crate::validate;

/// Drive the engine once per configuration, strictly in resolution order.
///
/// This is a short-circuiting fold: the first validation or engine failure
/// ends the whole batch — no partial-success reporting, no rollback. Watch
/// handles from successful runs accumulate in the same order.
pub fn run<H, E>(configurations: &[Configuration], mut process: E) -> Result<Vec<H>, Fatal>
where
  E: FnMut(&Configuration) -> anyhow::Result<Vec<H>>,
{
  let total = configurations.len();
  let mut handles: Vec<H> = Vec::new();
  for (index, cfg) in configurations.iter().enumerate() {
    validate::validate(cfg)?;
    if total > 1 {
      info!("processing configuration {}/{}", index + 1, total);
    }
    handles.extend(process(cfg)?);
  }
  Ok(handles)
}
