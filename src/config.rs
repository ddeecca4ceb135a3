use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Include/exclude pair of path sets.
///
/// Excludes narrow what the engine consumes, but every declared path — included
/// or excluded — must still point at a readable location, so readability checks
/// run over `all_paths`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paths {
  pub include: Vec<PathBuf>,
  pub exclude: Vec<PathBuf>,
}

impl Paths {
  pub fn new(include: Vec<PathBuf>, exclude: Vec<PathBuf>) -> Self {
    Paths { include, exclude }
  }

  pub fn all_paths(&self) -> impl Iterator<Item = &PathBuf> {
    self.include.iter().chain(self.exclude.iter())
  }

  pub fn is_empty(&self) -> bool {
    self.include.is_empty() && self.exclude.is_empty()
  }
}

/// One generation job: where to read, what to render, where to write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Configuration {
  pub sources: Paths,
  pub templates: Paths,
  pub output: PathBuf,
  /// Engine artifact-cache root; opaque at this layer.
  pub cache_base_path: Option<PathBuf>,
  /// Extensions parsed even when the file looks engine-generated.
  pub force_parse: Vec<String>,
  /// Opaque key=value pairs handed to the templates.
  pub args: BTreeMap<String, String>,
}

impl Configuration {
  /// Transcribe CLI flags into a single configuration. Pure: no filesystem
  /// access, no failure modes.
  pub fn from_flags(
    sources: Vec<PathBuf>,
    exclude_sources: Vec<PathBuf>,
    templates: Vec<PathBuf>,
    exclude_templates: Vec<PathBuf>,
    output: Option<PathBuf>,
    force_parse: Vec<String>,
    raw_args: &[String],
  ) -> Self {
    Configuration {
      sources: Paths::new(sources, exclude_sources),
      templates: Paths::new(templates, exclude_templates),
      output: output.unwrap_or_else(|| PathBuf::from(".")),
      cache_base_path: None,
      force_parse,
      args: parse_args(raw_args),
    }
  }

  /// Rebase every relative path in the configuration against `base`.
  pub fn rebase(&mut self, base: &Path) {
    let rebase_one = |p: &mut PathBuf| {
      if p.is_relative() {
        *p = base.join(&*p);
      }
    };
    self.sources.include.iter_mut().for_each(rebase_one);
    self.sources.exclude.iter_mut().for_each(rebase_one);
    self.templates.include.iter_mut().for_each(rebase_one);
    self.templates.exclude.iter_mut().for_each(rebase_one);
    if self.output.is_relative() {
      self.output = base.join(&self.output);
    }
    if let Some(cache) = &mut self.cache_base_path {
      if cache.is_relative() {
        *cache = base.join(&*cache);
      }
    }
  }
}

/// Parse raw `--args` fragments into the template-arguments map.
///
/// Fragments are joined with commas first, so `--args a=1,b=2 --args c=3` and
/// `--args a=1 --args b=2 --args c=3` are equivalent. Malformed fragments are
/// dropped rather than reported; a partial map is acceptable output here.
pub fn parse_args(raw: &[String]) -> BTreeMap<String, String> {
  let mut out = BTreeMap::new();
  for pair in raw.join(",").split(',') {
    let pair = pair.trim();
    if pair.is_empty() {
      continue;
    }
    if let Some((key, value)) = pair.split_once('=') {
      let key = key.trim();
      if !key.is_empty() {
        out.insert(key.to_string(), value.trim().to_string());
      }
    }
  }
  out
}
