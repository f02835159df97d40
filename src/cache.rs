//! Last-applied manifest per destination, used to skip redundant rewrites.

use std::collections::HashMap;

use crate::manifest::Manifest;

/// Manifests most recently written, keyed by destination file name.
#[derive(Debug, Clone, Default)]
pub struct ManifestCache {
  applied: HashMap<String, Manifest>,
}

impl ManifestCache {
  /// Create an empty cache.
  pub fn new() -> Self {
    Self::default()
  }

  /// True when `manifest` matches, key for key and in order, what was last written to `dest`.
  ///
  /// A destination that was never written is never current.
  pub fn is_current(&self, dest: &str, manifest: &Manifest) -> bool {
    self.applied.get(dest) == Some(manifest)
  }

  /// Manifest last written to `dest`.
  pub fn previous(&self, dest: &str) -> Option<&Manifest> {
    self.applied.get(dest)
  }

  /// Replace the entry for `dest` after a successful write.
  pub fn store(&mut self, dest: impl Into<String>, manifest: Manifest) {
    self.applied.insert(dest.into(), manifest);
  }
}
