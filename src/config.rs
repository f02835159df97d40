//! Settings loader describing where the manifest, template and output live.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// File names searched for when no explicit configuration file is given.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["html.config.json", "html.config.yaml", "html.config.yml"];

/// Resolved injector settings. Unspecified keys fall back to [`Settings::default`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bundler manifest mapping chunk names to emitted filenames.
    pub manifest: PathBuf,
    /// HTML template containing the bundle markers.
    pub source: PathBuf,
    /// Output directory, or output file when it carries an `.html` extension in single mode.
    pub dest: PathBuf,
    /// Write one HTML file per manifest entry instead of a single page.
    pub multi: bool,
    /// Debounce interval for watch mode, in milliseconds.
    pub watch: u64,
    /// Group chunks by exact key segment rather than by substring.
    pub strict_groups: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest: "./manifest.json".into(),
            source: "src/index.html".into(),
            dest: "public/".into(),
            multi: false,
            watch: 250,
            strict_groups: false,
        }
    }
}

/// Errors raised while loading an explicitly requested configuration file.
#[derive(Debug)]
pub enum ConfigError {
    /// No configuration file exists at the given path.
    NotFound {
        /// Path that was searched.
        path: PathBuf,
    },
    /// Failed to read the configuration file.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// The JSON configuration could not be parsed.
    Json {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
    /// The YAML configuration could not be parsed.
    Yaml {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_yaml::Error,
    },
}

impl Settings {
    /// Resolve settings from an explicit path, the working directory, or defaults, in that order.
    ///
    /// A failure to load an explicitly named file is reported, whereas a broken default file in
    /// the working directory only logs a warning before falling back to defaults.
    pub fn resolve(explicit: Option<&Path>, working_dir: &Path) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_path(&working_dir.join(path)),
            None => Ok(Self::discover(working_dir)),
        }
    }

    /// Attempt to load one of the default configuration files from the provided directory.
    pub fn discover(dir: &Path) -> Self {
        let Some(candidate) = find_default_file(dir) else {
            return Self::default();
        };
        match Self::from_file(&candidate) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("{err}; using default settings");
                Self::default()
            }
        }
    }

    /// Read settings from a file, or from a directory holding one of the default file names.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if path.is_dir() {
            let candidate = find_default_file(path).ok_or_else(|| ConfigError::NotFound {
                path: path.join(DEFAULT_CONFIG_FILES[0]),
            })?;
            return Self::from_file(&candidate);
        }
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_file(path)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Debounce interval applied between a manifest change and the rebuild.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.watch)
    }

    /// Whether `dest` names the output file itself rather than a directory.
    pub fn dest_is_file(&self) -> bool {
        !self.multi
            && self
                .dest
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
    }
}

fn find_default_file(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml" | "yml")
    )
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { path } => write!(f, "config file not found at {}", path.display()),
            Self::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
            Self::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            Self::Yaml { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound { .. } => None,
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Yaml { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_when_nothing_is_configured() {
        let dir = tempdir().unwrap();
        let settings = Settings::resolve(None, dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.debounce(), Duration::from_millis(250));
    }

    #[test]
    fn explicit_file_overrides_only_given_keys() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("site.json"),
            r#"{"manifest": "test/dest/manifest.json", "source": "test/index.html", "dest": "test/dest/"}"#,
        )
        .unwrap();

        let settings = Settings::resolve(Some(Path::new("site.json")), dir.path()).unwrap();
        assert_eq!(settings.manifest, PathBuf::from("test/dest/manifest.json"));
        assert_eq!(settings.source, PathBuf::from("test/index.html"));
        assert_eq!(settings.dest, PathBuf::from("test/dest/"));
        assert!(!settings.multi);
        assert_eq!(settings.watch, 250);
    }

    #[test]
    fn explicit_directory_uses_default_file_name() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("web");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("html.config.yaml"), "multi: true\nwatch: 40\n").unwrap();

        let settings = Settings::resolve(Some(Path::new("web")), dir.path()).unwrap();
        assert!(settings.multi);
        assert_eq!(settings.watch, 40);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = Settings::resolve(Some(Path::new("nope.json")), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("html.config.json");
        fs::write(&path, r#"{"manifest": "m.json", "polling": 5}"#).unwrap();

        let err = Settings::from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
    }

    #[test]
    fn broken_default_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("html.config.json"), "{ not json").unwrap();

        let settings = Settings::discover(dir.path());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn html_dest_is_a_file_only_in_single_mode() {
        let mut settings = Settings {
            dest: "public/home.html".into(),
            ..Settings::default()
        };
        assert!(settings.dest_is_file());

        settings.multi = true;
        assert!(!settings.dest_is_file());
        assert!(!Settings::default().dest_is_file());
    }
}
