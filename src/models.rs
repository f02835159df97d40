//! Data structures describing what an injection run produced.

use std::path::PathBuf;

use crate::assets::AssetKind;

/// One tag injected into a destination page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectedAsset {
  /// Manifest key (chunk name).
  pub key: String,
  /// Emitted filename referenced by the tag.
  pub file: String,
  /// Tag kind the chunk was classified as.
  pub kind: AssetKind,
  /// Whether the filename differs from the one last written for this key.
  pub changed: bool,
}

/// Outcome for a single destination page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationStatus {
  /// The page was rewritten at the given path.
  Written(PathBuf),
  /// The manifest matched the cached one, nothing was read or written.
  Unchanged,
}

/// Report for a single destination page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationReport {
  /// Destination file name, also the cache key.
  pub name: String,
  /// Whether the page was written.
  pub status: DestinationStatus,
  /// Tags injected, in manifest order. Empty when unchanged.
  pub assets: Vec<InjectedAsset>,
}

impl DestinationReport {
  /// Path written, if any.
  pub fn written_path(&self) -> Option<&PathBuf> {
    match &self.status {
      DestinationStatus::Written(path) => Some(path),
      DestinationStatus::Unchanged => None,
    }
  }

  /// Keys whose filenames changed since the previous write.
  pub fn changed_keys(&self) -> Vec<&str> {
    self
      .assets
      .iter()
      .filter(|asset| asset.changed)
      .map(|asset| asset.key.as_str())
      .collect()
  }
}

/// Result of one orchestrator run across all destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
  /// One report per destination, in processing order.
  pub destinations: Vec<DestinationReport>,
}

impl RunSummary {
  /// Report for a destination file name.
  pub fn destination(&self, name: &str) -> Option<&DestinationReport> {
    self.destinations.iter().find(|report| report.name == name)
  }

  /// Number of pages actually written.
  pub fn written_count(&self) -> usize {
    self
      .destinations
      .iter()
      .filter(|report| report.written_path().is_some())
      .count()
  }
}
