//! Classification of manifest chunks into the tag kinds injected into the template.

use std::fmt;
use std::str::FromStr;

/// Kind of tag emitted for a manifest chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
  /// Stylesheet `<link>` placed in the document head.
  Stylesheet,
  /// Shared vendor `<script>` placed in the document head.
  VendorScript,
  /// Page `<script>` placed at the end of the body.
  MainScript,
}

/// Error returned when parsing an unknown asset category label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAssetKind(pub String);

impl AssetKind {
  /// Classify a manifest entry, returning `None` for files that get no tag.
  pub fn classify(key: &str, file: &str) -> Option<Self> {
    if file.ends_with(".css") {
      Some(Self::Stylesheet)
    } else if file.ends_with(".js") && key.contains("vendor") {
      Some(Self::VendorScript)
    } else if file.ends_with(".js") {
      Some(Self::MainScript)
    } else {
      None
    }
  }

  /// Short category label, as printed in logs.
  pub fn label(self) -> &'static str {
    match self {
      Self::Stylesheet => "css",
      Self::VendorScript => "vendorjs",
      Self::MainScript => "mainjs",
    }
  }

  /// True when the tag belongs above the head marker rather than the main marker.
  pub fn in_head(self) -> bool {
    matches!(self, Self::Stylesheet | Self::VendorScript)
  }

  /// HTML tag referencing `file` from the site root.
  pub fn render_tag(self, file: &str) -> String {
    match self {
      Self::Stylesheet => format!(r#"<link rel="stylesheet" type="text/css" href="/{file}">"#),
      Self::VendorScript | Self::MainScript => {
        format!(r#"<script type="text/javascript" src="/{file}"></script>"#)
      }
    }
  }
}

impl fmt::Display for AssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl FromStr for AssetKind {
  type Err = UnknownAssetKind;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "css" => Ok(Self::Stylesheet),
      "vendorjs" => Ok(Self::VendorScript),
      "mainjs" => Ok(Self::MainScript),
      other => Err(UnknownAssetKind(other.to_string())),
    }
  }
}

impl fmt::Display for UnknownAssetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "unknown asset type '{}'", self.0)
  }
}

impl std::error::Error for UnknownAssetKind {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_by_extension_and_vendor_key() {
    assert_eq!(AssetKind::classify("foo.css", "4.css"), Some(AssetKind::Stylesheet));
    assert_eq!(
      AssetKind::classify("vendors~foo~bar.js", "3.js"),
      Some(AssetKind::VendorScript)
    );
    assert_eq!(AssetKind::classify("foo.js", "0.js"), Some(AssetKind::MainScript));
    assert_eq!(AssetKind::classify("vendor.css", "v.css"), Some(AssetKind::Stylesheet));
  }

  #[test]
  fn skips_other_extensions() {
    assert_eq!(AssetKind::classify("logo.svg", "logo.abc123.svg"), None);
    assert_eq!(AssetKind::classify("app.js.map", "app.js.map"), None);
    assert_eq!(AssetKind::classify("vendor.wasm", "vendor.wasm"), None);
  }

  #[test]
  fn renders_root_relative_tags() {
    assert_eq!(
      AssetKind::Stylesheet.render_tag("css/app.1a2b.css"),
      r#"<link rel="stylesheet" type="text/css" href="/css/app.1a2b.css">"#
    );
    assert_eq!(
      AssetKind::MainScript.render_tag("0.js"),
      r#"<script type="text/javascript" src="/0.js"></script>"#
    );
  }

  #[test]
  fn parses_category_labels() {
    for kind in [AssetKind::Stylesheet, AssetKind::VendorScript, AssetKind::MainScript] {
      assert_eq!(kind.label().parse::<AssetKind>(), Ok(kind));
    }
    assert_eq!(
      "font".parse::<AssetKind>(),
      Err(UnknownAssetKind("font".to_string()))
    );
  }
}
