use std::collections::BTreeMap;

use chrono::Local;
use clap::Parser;
use log::error;

mod cli;
mod config;
mod engine;
mod error;
mod lifecycle;
mod loader;
mod orchestrator;
mod util;
mod validate;

use crate::cli::Cli;
use crate::engine::{Engine, WatcherHandle};
use crate::error::Fatal;

fn main() {
  let cli = Cli::parse();

  if cli.gen_man {
    match util::render_man_page::<Cli>() {
      Ok(page) => print!("{}", page),
      Err(err) => {
        eprintln!("{:#}", err);
        std::process::exit(Fatal::Other(err).exit_code());
      }
    }
    return;
  }

  // Log level is fixed once here and never mutated afterward.
  env_logger::Builder::new()
    .filter_level(cli.log_level())
    .format_timestamp(None)
    .format_target(false)
    .init();

  let started_at = Local::now();

  match run(&cli) {
    Ok(handles) => lifecycle::finish(handles, started_at),
    Err(fatal) => {
      error!("{:#}", fatal);
      std::process::exit(fatal.exit_code());
    }
  }
}

fn run(cli: &Cli) -> Result<Vec<WatcherHandle>, Fatal> {
  // Phase 1: resolve configurations (descriptor, or the flag fallback).
  let env: BTreeMap<String, String> = std::env::vars().collect();
  let configurations = loader::resolve(cli, &env)?;

  // Phase 2: validate and run each configuration in order, fail-fast.
  let engine = Engine::new(cli.engine_settings());
  orchestrator::run(&configurations, |cfg| engine.process_files(cfg))
}
