//! Splitting one manifest into per-entry sub-manifests for multi-page output.

use std::sync::OnceLock;

use regex::Regex;

use super::Manifest;

/// Entry name whose chunks are shared code rather than a page of their own.
const VENDOR_ENTRY: &str = "vendors";

/// How a manifest key is matched against an entry name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupMatch {
  /// Any key containing the entry name as a substring belongs to it.
  #[default]
  Substring,
  /// A key belongs to an entry only when one of its `~`, `.` or `$` separated segments equals it.
  Segment,
}

/// Chunks required by one generated HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryGroup {
  /// Entry name, also the stem of the generated HTML file.
  pub name: String,
  /// Manifest subset injected into that page.
  pub manifest: Manifest,
}

fn entry_pattern() -> &'static Regex {
  static PATTERN: OnceLock<Regex> = OnceLock::new();
  PATTERN.get_or_init(|| Regex::new(r"^([^~.$]+)[~.$]").expect("invalid entry name regex"))
}

/// Leading identifier of a chunk key, up to the first `~`, `.` or `$`.
pub fn entry_name(key: &str) -> Option<&str> {
  entry_pattern()
    .captures(key)
    .and_then(|caps| caps.get(1))
    .map(|name| name.as_str())
}

/// Group manifest chunks by the entries that need them.
///
/// Entries appear in order of first appearance; `vendors` never becomes an entry of its own,
/// but its chunks are pulled into every entry whose name they mention.
pub fn group_entries(manifest: &Manifest, matching: GroupMatch) -> Vec<EntryGroup> {
  let mut names: Vec<&str> = Vec::new();
  for (key, _) in manifest.iter() {
    let Some(name) = entry_name(key) else {
      tracing::warn!(key, "manifest key has no entry name, skipping");
      continue;
    };
    if name == VENDOR_ENTRY || names.contains(&name) {
      continue;
    }
    names.push(name);
  }

  names
    .into_iter()
    .map(|name| EntryGroup {
      name: name.to_string(),
      manifest: manifest
        .iter()
        .filter(|(key, _)| belongs_to(key, name, matching))
        .collect(),
    })
    .collect()
}

fn belongs_to(key: &str, name: &str, matching: GroupMatch) -> bool {
  match matching {
    GroupMatch::Substring => key.contains(name),
    GroupMatch::Segment => key.split(['~', '.', '$']).any(|segment| segment == name),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn shared_manifest() -> Manifest {
    [
      ("foo.js", "0.js"),
      ("bar.js", "1.js"),
      ("foo~bar.js", "2.js"),
      ("vendors~foo~bar.js", "3.js"),
      ("foo.css", "4.css"),
      ("foo~bar.css", "5.css"),
    ]
    .into_iter()
    .collect()
  }

  fn keys(group: &EntryGroup) -> Vec<&str> {
    group.manifest.iter().map(|(key, _)| key).collect()
  }

  #[test]
  fn extracts_leading_identifier() {
    assert_eq!(entry_name("foo.js"), Some("foo"));
    assert_eq!(entry_name("vendors~foo~bar.js"), Some("vendors"));
    assert_eq!(entry_name("runtime$chunk"), Some("runtime"));
    assert_eq!(entry_name("noseparator"), None);
    assert_eq!(entry_name(".hidden"), None);
  }

  #[test]
  fn groups_shared_chunks_into_every_entry() {
    let groups = group_entries(&shared_manifest(), GroupMatch::Substring);

    let names: Vec<&str> = groups.iter().map(|group| group.name.as_str()).collect();
    assert_eq!(names, vec!["foo", "bar"]);

    assert_eq!(keys(&groups[0]), vec![
      "foo.js",
      "foo~bar.js",
      "vendors~foo~bar.js",
      "foo.css",
      "foo~bar.css"
    ]);
    assert_eq!(keys(&groups[1]), vec![
      "bar.js",
      "foo~bar.js",
      "vendors~foo~bar.js",
      "foo~bar.css"
    ]);
  }

  #[test]
  fn substring_matching_captures_longer_names() {
    let manifest: Manifest = [("foo.js", "0.js"), ("foobar.js", "1.js")]
      .into_iter()
      .collect();

    let fuzzy = group_entries(&manifest, GroupMatch::Substring);
    assert_eq!(keys(&fuzzy[0]), vec!["foo.js", "foobar.js"]);

    let strict = group_entries(&manifest, GroupMatch::Segment);
    assert_eq!(keys(&strict[0]), vec!["foo.js"]);
    assert_eq!(keys(&strict[1]), vec!["foobar.js"]);
  }

  #[test]
  fn vendor_only_manifest_produces_no_entries() {
    let manifest: Manifest = [("vendors~main.js", "0.js"), ("vendors.css", "1.css")]
      .into_iter()
      .collect();
    assert!(group_entries(&manifest, GroupMatch::Substring).is_empty());
  }
}
