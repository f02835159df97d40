//! Injection orchestrator: loads the manifest, gates on the cache and writes pages.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use same_file::is_same_file;

use crate::assets::AssetKind;
use crate::cache::ManifestCache;
use crate::config::Settings;
use crate::manifest::{GroupMatch, Manifest, group_entries};
use crate::models::{DestinationReport, DestinationStatus, InjectedAsset, RunSummary};
use crate::template::Template;

/// Writes manifest assets into HTML pages, remembering what each page last received.
pub struct Injector {
  settings: Settings,
  cache: ManifestCache,
}

impl Injector {
  /// Create an injector with an empty cache.
  pub fn new(settings: Settings) -> Self {
    Self {
      settings,
      cache: ManifestCache::new(),
    }
  }

  /// Manifests last written per destination.
  pub fn cache(&self) -> &ManifestCache {
    &self.cache
  }

  /// Load the manifest and bring every destination page up to date.
  ///
  /// Fails with a [`crate::ManifestError`] before touching any file when the manifest is
  /// missing or malformed.
  pub fn run(&mut self) -> Result<RunSummary> {
    self.run_with(|_| {})
  }

  /// Like [`Injector::run`], handing each page report to `on_page` as soon as it exists.
  ///
  /// Pages finished before a failing page have already been reported when the error returns.
  pub fn run_with<F: FnMut(&DestinationReport)>(&mut self, mut on_page: F) -> Result<RunSummary> {
    let manifest = Manifest::load(&self.settings.manifest)?;
    let mut summary = RunSummary::default();

    let pages: Vec<(String, Manifest)> = if self.settings.multi {
      let matching = if self.settings.strict_groups {
        GroupMatch::Segment
      } else {
        GroupMatch::Substring
      };
      group_entries(&manifest, matching)
        .into_iter()
        .map(|group| (format!("{}.html", group.name), group.manifest))
        .collect()
    } else {
      vec![(self.single_dest_name()?, manifest)]
    };

    for (dest_name, page_manifest) in pages {
      let report = self.apply(&page_manifest, &dest_name)?;
      on_page(&report);
      summary.destinations.push(report);
    }

    Ok(summary)
  }

  /// Inject `manifest` into the template and write it as `dest_name`, unless the cache
  /// shows the page already holds exactly this manifest.
  pub fn apply(&mut self, manifest: &Manifest, dest_name: &str) -> Result<DestinationReport> {
    if self.cache.is_current(dest_name, manifest) {
      tracing::debug!(dest = dest_name, "manifest unchanged, skipping");
      return Ok(DestinationReport {
        name: dest_name.to_string(),
        status: DestinationStatus::Unchanged,
        assets: Vec::new(),
      });
    }

    let mut template = Template::read(&self.settings.source)?;
    let assets = inject_manifest(&mut template, manifest, self.cache.previous(dest_name));

    let dest_path = self.dest_path(dest_name);
    write_page(&self.settings.source, &dest_path, template.as_str())?;
    tracing::info!(dest = %dest_path.display(), assets = assets.len(), "wrote page");

    self.cache.store(dest_name, manifest.clone());
    Ok(DestinationReport {
      name: dest_name.to_string(),
      status: DestinationStatus::Written(dest_path),
      assets,
    })
  }

  fn single_dest_name(&self) -> Result<String> {
    let named = if self.settings.dest_is_file() {
      &self.settings.dest
    } else {
      &self.settings.source
    };
    named
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| anyhow!("cannot derive an output file name from {}", named.display()))
  }

  fn dest_path(&self, dest_name: &str) -> PathBuf {
    if self.settings.dest_is_file() {
      self.settings.dest.clone()
    } else {
      self.settings.dest.join(dest_name)
    }
  }
}

/// Insert a tag for every classifiable chunk of `manifest`, in manifest order.
///
/// `previous` is the manifest last written to the same page; chunks whose filename differs
/// from it are flagged as changed.
pub fn inject_manifest(
  template: &mut Template,
  manifest: &Manifest,
  previous: Option<&Manifest>,
) -> Vec<InjectedAsset> {
  let mut assets = Vec::new();

  for (key, file) in manifest.iter() {
    let Some(kind) = AssetKind::classify(key, file) else {
      tracing::debug!(key, file, "no tag for chunk");
      continue;
    };
    template.insert(kind, file);

    let changed = previous.and_then(|previous| previous.get(key)) != Some(file);
    tracing::debug!(key, file, kind = kind.label(), changed, "injected chunk");
    assets.push(InjectedAsset {
      key: key.to_string(),
      file: file.to_string(),
      kind,
      changed,
    });
  }

  assets
}

fn write_page(template_path: &Path, dest_path: &Path, html: &str) -> Result<()> {
  if dest_path.exists() && is_same_file(template_path, dest_path).unwrap_or(false) {
    bail!(
      "refusing to overwrite template {} with generated output",
      template_path.display()
    );
  }

  if let Some(parent) = dest_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }

  fs::write(dest_path, html).with_context(|| format!("failed to write {}", dest_path.display()))
}
