use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{info, warn};
use regex::Regex;
use serde::Deserialize;

use crate::cli::Cli;
use crate::config::{Configuration, Paths};
use crate::error::Fatal;
use crate::validate;

/// Conventional descriptor filename, looked up when `--config` names a directory.
pub const DEFAULT_DESCRIPTOR: &str = "tplgen.toml";

/// Path sets in the descriptor: either a bare list (all included) or an
/// explicit include/exclude table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathsSpec {
  List(Vec<PathBuf>),
  Split {
    #[serde(default)]
    include: Vec<PathBuf>,
    #[serde(default)]
    exclude: Vec<PathBuf>,
  },
}

impl From<PathsSpec> for Paths {
  fn from(spec: PathsSpec) -> Paths {
    match spec {
      PathsSpec::List(include) => Paths::new(include, vec![]),
      PathsSpec::Split { include, exclude } => Paths::new(include, exclude),
    }
  }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct JobSpec {
  sources: Option<PathsSpec>,
  templates: Option<PathsSpec>,
  output: Option<PathBuf>,
  cache_base_path: Option<PathBuf>,
  force_parse: Vec<String>,
  args: BTreeMap<String, String>,
}

impl JobSpec {
  fn into_configuration(self, base: &Path) -> Configuration {
    let mut cfg = Configuration {
      sources: self.sources.map(Paths::from).unwrap_or_default(),
      templates: self.templates.map(Paths::from).unwrap_or_default(),
      output: self.output.unwrap_or_else(|| PathBuf::from(".")),
      cache_base_path: self.cache_base_path,
      force_parse: self.force_parse,
      args: self.args,
    };
    cfg.rebase(base);
    cfg
  }
}

/// Either one configuration spelled at the top level, or several under
/// `[[configurations]]`. The array wins when both appear.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Descriptor {
  configurations: Vec<JobSpec>,
  #[serde(flatten)]
  root: JobSpec,
}

/// Substitute `${VAR}` references from an environment snapshot. Unset
/// variables become the empty string, keeping this total over any input.
pub fn interpolate_env(raw: &str, env: &BTreeMap<String, String>) -> String {
  let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
  re.replace_all(raw, |caps: &regex::Captures<'_>| {
    env.get(&caps[1]).cloned().unwrap_or_default()
  })
  .into_owned()
}

/// Parse descriptor text into configurations. Pure with respect to the
/// filesystem and the process environment: the env snapshot is injected and
/// relative paths are rebased against `base` (the descriptor's directory).
pub fn parse_descriptor(
  raw: &str,
  base: &Path,
  env: &BTreeMap<String, String>,
) -> Result<Vec<Configuration>, toml::de::Error> {
  let text = interpolate_env(raw, env);
  let descriptor: Descriptor = toml::from_str(&text)?;
  let specs = if descriptor.configurations.is_empty() {
    vec![descriptor.root]
  } else {
    descriptor.configurations
  };
  Ok(specs.into_iter().map(|spec| spec.into_configuration(base)).collect())
}

fn flag_configuration(cli: &Cli) -> Configuration {
  Configuration::from_flags(
    cli.sources.clone(),
    cli.exclude_sources.clone(),
    cli.templates.clone(),
    cli.exclude_templates.clone(),
    cli.output.clone(),
    cli.force_parse.clone(),
    &cli.args,
  )
}

/// Resolve the run's configurations: a readable descriptor yields 1..N of
/// them verbatim; a missing descriptor falls back to the CLI flags. A
/// descriptor that exists but cannot be read or parsed is fatal — there is no
/// fallback for that case.
pub fn resolve(cli: &Cli, env: &BTreeMap<String, String>) -> Result<Vec<Configuration>, Fatal> {
  let descriptor_path = if cli.config.is_dir() {
    cli.config.join(DEFAULT_DESCRIPTOR)
  } else {
    cli.config.clone()
  };

  if !descriptor_path.exists() {
    info!(
      "no descriptor at '{}'; using command-line flags",
      descriptor_path.display()
    );
    return Ok(vec![flag_configuration(cli)]);
  }

  if !validate::is_readable(&descriptor_path) {
    return Err(Fatal::unreadable(&descriptor_path));
  }
  let raw = std::fs::read_to_string(&descriptor_path)
    .map_err(|_| Fatal::unreadable(&descriptor_path))?;

  // Rebase against the descriptor's own directory, not the process cwd.
  let base = std::fs::canonicalize(&descriptor_path)
    .ok()
    .and_then(|p| p.parent().map(Path::to_path_buf))
    .unwrap_or_else(|| PathBuf::from("."));

  let configurations = parse_descriptor(&raw, &base, env).map_err(|err| {
    Fatal::InvalidConfig(format!(
      "failed to parse descriptor '{}': {}",
      descriptor_path.display(),
      err
    ))
  })?;

  if cli.has_generation_flags() {
    warn!(
      "descriptor '{}' is in use; source/template/output/force-parse/args flags are ignored",
      descriptor_path.display()
    );
  }

  Ok(configurations)
}
