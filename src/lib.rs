#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod assets;
pub mod cache;
pub mod config;
pub mod injector;
pub mod manifest;
pub mod models;
pub mod report;
pub mod template;
pub mod watch;

pub use assets::AssetKind;
pub use cache::ManifestCache;
pub use config::{ConfigError, Settings};
pub use injector::{Injector, inject_manifest};
pub use manifest::{EntryGroup, GroupMatch, Manifest, ManifestError, group_entries};
pub use models::{DestinationReport, DestinationStatus, InjectedAsset, RunSummary};
pub use template::{HEAD_MARKER, MAIN_MARKER, Template};
pub use watch::{Debouncer, ManifestWatcher, WatchHandle};
