use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tplgen",
    version,
    about = "Drive template-based code generation (one-shot or watch)",
    long_about = None
)]
pub struct Cli {
  /// Watch sources and templates, regenerating on change
  #[arg(long, short = 'w')]
  pub watch: bool,

  /// Disable the engine-side artifact cache
  #[arg(long = "disableCache")]
  pub disable_cache: bool,

  /// Verbose logging (also enables AST and benchmark logging unless quiet)
  #[arg(long, short = 'v')]
  pub verbose: bool,

  /// Log the parsed source listing, independent of --verbose
  #[arg(long = "logAST")]
  pub log_ast: bool,

  /// Log per-configuration timings, independent of --verbose
  #[arg(long = "logBenchmarks")]
  pub log_benchmarks: bool,

  /// Errors only; overrides --verbose
  #[arg(long, short = 'q')]
  pub quiet: bool,

  /// Remove generated outputs that rendered empty
  #[arg(long, short = 'p')]
  pub prune: bool,

  /// Source path (file or directory); repeatable
  #[arg(long = "sources")]
  pub sources: Vec<PathBuf>,

  /// Source path to exclude; repeatable
  #[arg(long = "exclude-sources")]
  pub exclude_sources: Vec<PathBuf>,

  /// Template path (file or directory); repeatable
  #[arg(long = "templates")]
  pub templates: Vec<PathBuf>,

  /// Template path to exclude; repeatable
  #[arg(long = "exclude-templates")]
  pub exclude_templates: Vec<PathBuf>,

  /// Output file or directory (default: current directory)
  #[arg(long)]
  pub output: Option<PathBuf>,

  /// Descriptor file, or a directory containing the default one (default: cwd)
  #[arg(long, default_value = ".")]
  pub config: PathBuf,

  /// File extension to parse even if engine-generated; repeatable
  #[arg(long = "force-parse")]
  pub force_parse: Vec<String>,

  /// Raw key=value argument for templates; repeatable, comma-separable
  #[arg(long = "args")]
  pub args: Vec<String>,

  /// Bootstrap script for the EJS template variant (default: next to the executable)
  #[arg(long = "ejsPath")]
  pub ejs_path: Option<PathBuf>,

  /// Emit a troff man page to stdout (internal; for packaging)
  #[arg(long, hide = true)]
  pub gen_man: bool,
}

impl Cli {
  /// Process-wide log level: quiet beats verbose beats the info default.
  /// Chosen once at startup and never changed afterward.
  pub fn log_level(&self) -> LevelFilter {
    if self.quiet {
      LevelFilter::Error
    } else if self.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    }
  }

  /// True when any flag that a descriptor would override was supplied.
  pub fn has_generation_flags(&self) -> bool {
    !self.sources.is_empty()
      || !self.exclude_sources.is_empty()
      || !self.templates.is_empty()
      || !self.exclude_templates.is_empty()
      || self.output.is_some()
      || !self.force_parse.is_empty()
      || !self.args.is_empty()
  }

  pub fn engine_settings(&self) -> EngineSettings {
    EngineSettings {
      verbose: self.verbose && !self.quiet,
      watch: self.watch,
      cache_disabled: self.disable_cache,
      prune: self.prune,
      log_ast: (self.log_ast || self.verbose) && !self.quiet,
      log_benchmarks: (self.log_benchmarks || self.verbose) && !self.quiet,
      ejs_path: self.ejs_path.clone().unwrap_or_else(default_ejs_path),
    }
  }
}

/// Flags that configure the engine, bound identically to every configuration
/// in the run.
#[derive(Debug, Clone)]
pub struct EngineSettings {
  pub verbose: bool,
  pub watch: bool,
  pub cache_disabled: bool,
  pub prune: bool,
  pub log_ast: bool,
  pub log_benchmarks: bool,
  pub ejs_path: PathBuf,
}

/// When `--ejsPath` is omitted the bootstrap script is expected to ship next
/// to the binary itself, not in the invocation directory.
fn default_ejs_path() -> PathBuf {
  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(|dir| dir.join("ejs/bootstrap.js")))
    .unwrap_or_else(|| PathBuf::from("ejs/bootstrap.js"))
}
