use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, error, info};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use regex::Regex;
use walkdir::WalkDir;

use crate::cli::EngineSettings;
use crate::config::Configuration;

/// First line of every artifact this engine writes. Files carrying it are
/// skipped on the next parse unless their extension is force-parsed.
const GENERATED_MARKER: &str = "// Generated by tplgen - do not edit";

/// Suffix stripped from template file names when deriving artifact names.
const TEMPLATE_SUFFIX: &str = ".tpl";

/// An active filesystem subscription. Dropping the handle cancels the
/// subscription, so whoever holds it decides how long watch mode lives.
pub struct WatcherHandle {
  _watcher: RecommendedWatcher,
}

impl fmt::Debug for WatcherHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("WatcherHandle")
  }
}

/// The generation engine: parses sources, renders templates, writes artifacts.
pub struct Engine {
  settings: EngineSettings,
}

impl Engine {
  pub fn new(settings: EngineSettings) -> Self {
    Engine { settings }
  }

  /// Run one configuration to completion. In watch mode, additionally
  /// registers a change subscription over the configuration's roots and
  /// returns its handle; change events re-run generation in place.
  pub fn process_files(&self, cfg: &Configuration) -> Result<Vec<WatcherHandle>> {
    generate(cfg, &self.settings)?;

    if !self.settings.watch {
      return Ok(vec![]);
    }

    let watched: Vec<PathBuf> = cfg
      .sources
      .include
      .iter()
      .chain(cfg.templates.include.iter())
      .filter(|p| p.exists())
      .cloned()
      .collect();

    let cfg = cfg.clone();
    let settings = self.settings.clone();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
      match event {
        Ok(event) if event.kind.is_access() => {}
        Ok(_) => {
          debug!("change detected; regenerating");
          if let Err(err) = generate(&cfg, &settings) {
            // Watch mode survives a bad edit; the next change gets another try.
            error!("regeneration failed: {:#}", err);
          }
        }
        Err(err) => error!("watch error: {}", err),
      }
    })
    .context("starting filesystem watcher")?;

    for root in &watched {
      watcher
        .watch(root, RecursiveMode::Recursive)
        .with_context(|| format!("watching '{}'", root.display()))?;
    }
    info!("watching {} path(s) for changes", watched.len());

    Ok(vec![WatcherHandle { _watcher: watcher }])
  }
}

/// One generation pass: collect sources, render every template, write or
/// prune artifacts.
pub fn generate(cfg: &Configuration, settings: &EngineSettings) -> Result<()> {
  let started = Instant::now();

  let sources = collect_sources(cfg)?;
  if settings.log_ast {
    info!("parsed {} source file(s):", sources.len());
    for src in &sources {
      info!("  {}", src.display());
    }
  }

  let templates = collect_files(&cfg.templates.include, &cfg.templates.exclude)?;
  debug!("{} template(s) to render", templates.len());

  let single_file_output = looks_like_file(&cfg.output);
  if single_file_output {
    if let Some(parent) = cfg.output.parent() {
      fs::create_dir_all(parent)
        .with_context(|| format!("creating '{}'", parent.display()))?;
    }
  } else {
    fs::create_dir_all(&cfg.output)
      .with_context(|| format!("creating output directory '{}'", cfg.output.display()))?;
  }

  let mut cache = if settings.cache_disabled {
    None
  } else {
    Some(ArtifactCache::open(cache_dir(cfg)))
  };

  let mut combined = String::new();
  let mut written = 0usize;
  for template in &templates {
    if settings.verbose {
      debug!("rendering '{}'", template.display());
    }
    let raw = fs::read_to_string(template)
      .with_context(|| format!("reading template '{}'", template.display()))?;
    if template.extension().is_some_and(|ext| ext == "ejs") {
      debug!(
        "rendering '{}' via ejs bootstrap at '{}'",
        template.display(),
        settings.ejs_path.display()
      );
    }
    let body = render(&raw, &cfg.args, &sources);

    if single_file_output {
      combined.push_str(&body);
      continue;
    }

    let artifact = cfg.output.join(artifact_name(template));
    if settings.prune && body.trim().is_empty() {
      if artifact.exists() {
        fs::remove_file(&artifact)
          .with_context(|| format!("pruning '{}'", artifact.display()))?;
        info!("pruned empty artifact '{}'", artifact.display());
      }
      continue;
    }

    let content = format!("{}\n{}", GENERATED_MARKER, body);
    if let Some(cache) = &mut cache {
      if !cache.is_stale(&artifact, &content) && artifact.exists() {
        debug!("cache hit for '{}'", artifact.display());
        continue;
      }
      cache.record(&artifact, &content);
    }
    fs::write(&artifact, &content)
      .with_context(|| format!("writing artifact '{}'", artifact.display()))?;
    written += 1;
  }

  if single_file_output {
    if settings.prune && combined.trim().is_empty() {
      if cfg.output.exists() {
        fs::remove_file(&cfg.output)
          .with_context(|| format!("pruning '{}'", cfg.output.display()))?;
      }
    } else {
      let content = format!("{}\n{}", GENERATED_MARKER, combined);
      fs::write(&cfg.output, &content)
        .with_context(|| format!("writing artifact '{}'", cfg.output.display()))?;
      written = 1;
    }
  }

  if let Some(cache) = &cache {
    cache.persist();
  }

  if settings.log_benchmarks {
    info!(
      "rendered {} template(s), wrote {} artifact(s) in {} ms",
      templates.len(),
      written,
      started.elapsed().as_millis()
    );
  }
  Ok(())
}

/// Source files the engine will parse: everything under the include roots,
/// minus excluded prefixes, minus previously generated artifacts whose
/// extension is not force-parsed.
fn collect_sources(cfg: &Configuration) -> Result<Vec<PathBuf>> {
  let mut files = collect_files(&cfg.sources.include, &cfg.sources.exclude)?;
  files.retain(|path| {
    let forced = path
      .extension()
      .and_then(|e| e.to_str())
      .is_some_and(|ext| cfg.force_parse.iter().any(|f| f == ext));
    forced || !is_generated(path)
  });
  Ok(files)
}

fn collect_files(include: &[PathBuf], exclude: &[PathBuf]) -> Result<Vec<PathBuf>> {
  let mut files = Vec::new();
  for root in include {
    if root.is_file() {
      files.push(root.clone());
      continue;
    }
    for entry in WalkDir::new(root) {
      let entry = entry.with_context(|| format!("walking '{}'", root.display()))?;
      if entry.file_type().is_file() {
        files.push(entry.into_path());
      }
    }
  }
  files.retain(|path| !exclude.iter().any(|ex| path.starts_with(ex)));
  files.sort();
  files.dedup();
  Ok(files)
}

fn is_generated(path: &Path) -> bool {
  let mut head = String::new();
  use std::io::Read;
  match fs::File::open(path) {
    Ok(file) => {
      let _ = file.take(GENERATED_MARKER.len() as u64).read_to_string(&mut head);
      head.starts_with(GENERATED_MARKER)
    }
    Err(_) => false,
  }
}

/// Substitute `{{ key }}` placeholders from the template arguments, plus the
/// builtin `source_files` listing. Unknown keys render as empty.
fn render(raw: &str, args: &BTreeMap<String, String>, sources: &[PathBuf]) -> String {
  let re = Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}").unwrap();
  re.replace_all(raw, |caps: &regex::Captures<'_>| match &caps[1] {
    "source_files" => sources
      .iter()
      .map(|p| p.display().to_string())
      .collect::<Vec<_>>()
      .join("\n"),
    key => args.get(key).cloned().unwrap_or_default(),
  })
  .into_owned()
}

fn artifact_name(template: &Path) -> String {
  let name = template
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| "artifact".to_string());
  match name.strip_suffix(TEMPLATE_SUFFIX) {
    Some(stripped) if !stripped.is_empty() => stripped.to_string(),
    _ => name,
  }
}

fn looks_like_file(output: &Path) -> bool {
  if output.is_dir() {
    return false;
  }
  output.is_file() || output.extension().is_some()
}

fn cache_dir(cfg: &Configuration) -> PathBuf {
  cfg
    .cache_base_path
    .clone()
    .unwrap_or_else(|| std::env::temp_dir().join("tplgen-cache"))
}

/// Content-fingerprint index keyed by artifact path. Best-effort: a missing
/// or corrupt index just means every artifact is treated as stale.
struct ArtifactCache {
  dir: PathBuf,
  index: BTreeMap<String, String>,
}

impl ArtifactCache {
  fn open(dir: PathBuf) -> Self {
    let index = fs::read_to_string(dir.join("index.json"))
      .ok()
      .and_then(|raw| serde_json::from_str(&raw).ok())
      .unwrap_or_default();
    ArtifactCache { dir, index }
  }

  fn is_stale(&self, artifact: &Path, content: &str) -> bool {
    let key = artifact.display().to_string();
    self.index.get(&key).map(String::as_str) != Some(fingerprint(content).as_str())
  }

  fn record(&mut self, artifact: &Path, content: &str) {
    self.index.insert(artifact.display().to_string(), fingerprint(content));
  }

  fn persist(&self) {
    if fs::create_dir_all(&self.dir).is_ok() {
      if let Ok(raw) = serde_json::to_string_pretty(&self.index) {
        let _ = fs::write(self.dir.join("index.json"), raw);
      }
    }
  }
}

fn fingerprint(content: &str) -> String {
  // FNV-1a; cheap and stable, collisions only cost a redundant rewrite.
  let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
  for byte in content.as_bytes() {
    hash ^= u64::from(*byte);
    hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
  }
  format!("{:016x}", hash)
}
