//! Console output for injection runs.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::style::{Color, Stylize};

use crate::config::Settings;
use crate::manifest::ManifestError;
use crate::models::{DestinationReport, InjectedAsset};

/// Line printed after each written page and after the start-up banner.
pub const SEPARATOR: &str = "-----------";

const COLUMN_WIDTH: usize = 60;

static COLOR: AtomicBool = AtomicBool::new(false);

/// Enable ANSI colors on console lines. Off until enabled, so piped output stays plain.
pub fn set_color_enabled(enabled: bool) {
  COLOR.store(enabled, Ordering::Relaxed);
}

fn paint(text: String, color: Color) -> String {
  paint_when(COLOR.load(Ordering::Relaxed), text, color)
}

fn paint_when(enabled: bool, text: String, color: Color) -> String {
  if enabled {
    text.with(color).to_string()
  } else {
    text
  }
}

/// Render one injected asset: filename padded to a column, then the chunk key.
///
/// Filenames that changed since the previous write are highlighted.
pub fn asset_line(asset: &InjectedAsset) -> String {
  render_asset_line(asset, COLOR.load(Ordering::Relaxed))
}

fn render_asset_line(asset: &InjectedAsset, color: bool) -> String {
  let padded = format!("{:<width$}", asset.file, width = COLUMN_WIDTH);
  if asset.changed {
    format!("{} {}", paint_when(color, padded, Color::Green), asset.key)
  } else {
    format!("{} {}", padded, asset.key)
  }
}

/// Print a written page with its injected assets; unchanged pages print nothing.
pub fn print_destination(report: &DestinationReport) {
  let Some(path) = report.written_path() else {
    return;
  };
  for asset in &report.assets {
    println!("{}", asset_line(asset));
  }
  println!("{}", display_path(path));
  println!("{SEPARATOR}");
}

/// Banner for a single run.
pub fn print_processing(settings: &Settings) {
  println!("processing {}", settings.manifest.display());
  println!("{SEPARATOR}");
}

/// Banner for watch mode.
pub fn print_watching(settings: &Settings) {
  println!(
    "watching: {} {}",
    paint(settings.manifest.display().to_string(), Color::Blue),
    paint(format!("({}ms)", settings.watch), Color::Red)
  );
  println!("{SEPARATOR}");
}

/// Print a failed run, using the short form for a missing manifest.
pub fn print_error(err: &anyhow::Error) {
  match err.downcast_ref::<ManifestError>() {
    Some(manifest_err) if manifest_err.is_missing() => {
      println!("{}", paint("manifest file not found".to_string(), Color::Red));
    }
    _ => println!("{}", paint(format!("error: {err:#}"), Color::Red)),
  }
  println!("{SEPARATOR}");
}

fn display_path(path: &Path) -> String {
  std::path::absolute(path)
    .unwrap_or_else(|_| path.to_path_buf())
    .display()
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::assets::AssetKind;

  fn asset(changed: bool) -> InjectedAsset {
    InjectedAsset {
      key: "foo.css".into(),
      file: "4.css".into(),
      kind: AssetKind::Stylesheet,
      changed,
    }
  }

  #[test]
  fn unchanged_line_is_plain_and_padded() {
    let line = render_asset_line(&asset(false), true);
    assert_eq!(line, format!("4.css{} foo.css", " ".repeat(COLUMN_WIDTH - 5)));
  }

  #[test]
  fn changed_line_is_highlighted_only_with_color() {
    let plain = render_asset_line(&asset(true), false);
    assert_eq!(plain, format!("4.css{} foo.css", " ".repeat(COLUMN_WIDTH - 5)));
    assert!(!plain.contains('\u{1b}'));

    let colored = render_asset_line(&asset(true), true);
    assert!(colored.contains("4.css"));
    assert!(colored.ends_with(" foo.css"));
  }
}
