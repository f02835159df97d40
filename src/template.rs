//! Marker-based splicing of asset tags into the HTML template.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::assets::AssetKind;

/// Marker in the document head above which stylesheets and vendor scripts are placed.
pub const HEAD_MARKER: &str = "<!-- HEAD BUNDLES -->";
/// Marker near the end of the body above which page scripts are placed.
pub const MAIN_MARKER: &str = "<!-- MAIN BUNDLES -->";

/// Text inserted after each tag, re-indenting the marker line.
const TAG_SEPARATOR: &str = "\n    ";

/// In-memory HTML template being filled with asset tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  text: String,
}

impl Template {
  /// Wrap template text.
  pub fn new(text: impl Into<String>) -> Self {
    Self { text: text.into() }
  }

  /// Read the template from disk.
  pub fn read(path: &Path) -> Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| format!("failed to read template {}", path.display()))?;
    Ok(Self::new(text))
  }

  /// Insert the tag for `file` directly above the marker matching `kind`.
  ///
  /// Markers are left in place, so repeated inserts stack in call order above the marker.
  /// A template without the marker receives the tag at the very start of the buffer.
  pub fn insert(&mut self, kind: AssetKind, file: &str) {
    let marker = if kind.in_head() { HEAD_MARKER } else { MAIN_MARKER };
    let point = match self.text.find(marker) {
      Some(point) => point,
      None => {
        tracing::warn!(marker, file, "template marker not found, inserting at start");
        0
      }
    };

    let insert = format!("{}{}", kind.render_tag(file), TAG_SEPARATOR);
    self.text.insert_str(point, &insert);
  }

  /// Insert by category label (`css`, `vendorjs`, `mainjs`).
  ///
  /// Unknown labels are logged and leave the template unchanged.
  pub fn insert_labeled(&mut self, category: &str, file: &str) {
    match category.parse::<AssetKind>() {
      Ok(kind) => self.insert(kind, file),
      Err(err) => tracing::error!(file, "{err}"),
    }
  }

  /// Current template text.
  pub fn as_str(&self) -> &str {
    &self.text
  }

  /// Consume the template, returning its text.
  pub fn into_string(self) -> String {
    self.text
  }
}
