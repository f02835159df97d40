//! Loading the flat `chunk name -> emitted file` manifest written by the bundler.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Ordered mapping from chunk name to emitted filename.
///
/// Key order follows the JSON document, since tags are injected in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  entries: Vec<(String, String)>,
}

/// Errors that can occur while loading a manifest.
#[derive(Debug)]
pub enum ManifestError {
  /// No manifest exists at the configured path.
  Missing {
    /// Path that was expected to hold the manifest.
    path: PathBuf,
  },
  /// Failed to read the manifest from disk.
  Io {
    /// Path that caused the error.
    path: PathBuf,
    /// Source I/O error.
    source: std::io::Error,
  },
  /// The manifest is not valid JSON.
  Parse {
    /// Path that caused the error.
    path: PathBuf,
    /// Source parse error.
    source: serde_json::Error,
  },
  /// The manifest parsed, but its top level is not an object.
  NotAnObject {
    /// Path that caused the error.
    path: PathBuf,
  },
  /// A manifest value is not a string.
  InvalidValue {
    /// Path that caused the error.
    path: PathBuf,
    /// Key holding the offending value.
    key: String,
  },
}

impl Manifest {
  /// Load a manifest from disk.
  pub fn load(path: &Path) -> Result<Self, ManifestError> {
    if !path.exists() {
      return Err(ManifestError::Missing {
        path: path.to_path_buf(),
      });
    }

    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::parse(&content, path)
  }

  /// Parse manifest JSON; `origin` is only used for error reporting.
  pub fn parse(content: &str, origin: &Path) -> Result<Self, ManifestError> {
    let value: Value = serde_json::from_str(content).map_err(|source| ManifestError::Parse {
      path: origin.to_path_buf(),
      source,
    })?;
    let Value::Object(map) = value else {
      return Err(ManifestError::NotAnObject {
        path: origin.to_path_buf(),
      });
    };

    let mut entries = Vec::with_capacity(map.len());
    for (key, value) in map {
      match value {
        Value::String(file) => entries.push((key, file)),
        _ => {
          return Err(ManifestError::InvalidValue {
            path: origin.to_path_buf(),
            key,
          });
        }
      }
    }
    Ok(Self { entries })
  }

  /// Insert or replace an entry, keeping the position of an existing key.
  pub fn insert(&mut self, key: impl Into<String>, file: impl Into<String>) {
    let key = key.into();
    let file = file.into();
    match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
      Some(entry) => entry.1 = file,
      None => self.entries.push((key, file)),
    }
  }

  /// Emitted filename recorded for a chunk.
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(existing, _)| existing == key)
      .map(|(_, file)| file.as_str())
  }

  /// Iterate `(chunk name, emitted file)` pairs in manifest order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self
      .entries
      .iter()
      .map(|(key, file)| (key.as_str(), file.as_str()))
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Manifest {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut manifest = Manifest::default();
    for (key, file) in iter {
      manifest.insert(key, file);
    }
    manifest
  }
}

impl ManifestError {
  /// True when the manifest file does not exist at all.
  pub fn is_missing(&self) -> bool {
    matches!(self, Self::Missing { .. })
  }
}

impl std::fmt::Display for ManifestError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Missing { path } => write!(f, "manifest file not found at {}", path.display()),
      Self::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
      Self::Parse { path, source } => {
        write!(f, "failed to parse manifest {}: {}", path.display(), source)
      }
      Self::NotAnObject { path } => {
        write!(f, "manifest {} is not a JSON object", path.display())
      }
      Self::InvalidValue { path, key } => write!(
        f,
        "manifest {} maps '{}' to a non-string value",
        path.display(),
        key
      ),
    }
  }
}

impl std::error::Error for ManifestError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Io { source, .. } => Some(source),
      Self::Parse { source, .. } => Some(source),
      _ => None,
    }
  }
}
