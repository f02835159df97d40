//! Bundler manifest handling split into loading and per-entry grouping.

mod grouping;
mod loading;

pub use grouping::{EntryGroup, GroupMatch, entry_name, group_entries};
pub use loading::{Manifest, ManifestError};
