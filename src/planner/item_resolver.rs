use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Component, Path};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupMode {
    /// Only the hand-maintained item manifest
    CuratedOnly,
    /// Every top-level entry of the installation that holds a file
    FullTree,
}

impl BackupMode {
    /// Accepts the menu tokens `1`/`2` as well as `curated`/`full`.
    pub fn parse(input: &str) -> Result<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "curated" => Ok(BackupMode::CuratedOnly),
            "2" | "full" => Ok(BackupMode::FullTree),
            _ => Err(BackupError::invalid_selection(
                input,
                "backup mode must be 1 (curated) or 2 (full)",
            )),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            BackupMode::CuratedOnly => "important files only",
            BackupMode::FullTree => "full installation",
        }
    }
}

impl fmt::Display for BackupMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackupMode::CuratedOnly => write!(f, "curated"),
            BackupMode::FullTree => write!(f, "full"),
        }
    }
}

/// Top-level names considered essential under [`BackupMode::CuratedOnly`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemManifest {
    items: Vec<String>,
}

impl ItemManifest {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Produces the item names to copy from one installation.
pub struct ItemResolver<'a> {
    manifest: &'a ItemManifest,
}

impl<'a> ItemResolver<'a> {
    pub fn new(manifest: &'a ItemManifest) -> Self {
        Self { manifest }
    }

    pub fn resolve(&self, installation_root: &Path, mode: BackupMode) -> Vec<String> {
        match mode {
            BackupMode::CuratedOnly => self.manifest.items().to_vec(),
            BackupMode::FullTree => top_level_items_with_files(installation_root),
        }
    }
}

/// First path segment of every file or symbolic link below `root`,
/// deduplicated and sorted. Links are kept so the planner can copy or report
/// them. Top-level folders with nothing beneath them never appear.
fn top_level_items_with_files(root: &Path) -> Vec<String> {
    let mut items = BTreeSet::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!("Skipping unreadable entry during full scan: {}", err);
                None
            }
        });

    for entry in walker {
        if !entry.file_type().is_file() && !entry.path_is_symlink() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        if let Some(Component::Normal(first)) = relative.components().next() {
            items.insert(first.to_string_lossy().to_string());
        }
    }

    items.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_mode_parsing() {
        assert_eq!(BackupMode::parse("1").unwrap(), BackupMode::CuratedOnly);
        assert_eq!(BackupMode::parse(" 2\n").unwrap(), BackupMode::FullTree);
        assert_eq!(BackupMode::parse("Full").unwrap(), BackupMode::FullTree);
        assert_eq!(BackupMode::parse("curated").unwrap(), BackupMode::CuratedOnly);

        for invalid in ["0", "3", "", "both"] {
            assert!(matches!(
                BackupMode::parse(invalid),
                Err(BackupError::InvalidSelection { .. })
            ));
        }
    }

    #[test]
    fn test_curated_returns_manifest_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("B.ini"), "b").unwrap();

        let manifest = ItemManifest::new(["A", "B.ini"]);
        let items = ItemResolver::new(&manifest).resolve(temp_dir.path(), BackupMode::CuratedOnly);

        assert_eq!(items, vec!["A", "B.ini"]);
    }

    #[test]
    fn test_full_tree_uses_top_level_segments_with_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Drivers")).unwrap();
        fs::write(root.join("Drivers").join("x.bin"), [0u8, 1, 2]).unwrap();
        fs::write(root.join("Prefs.xml"), "<prefs/>").unwrap();
        fs::create_dir_all(root.join("Logs")).unwrap();

        let manifest = ItemManifest::new(Vec::<String>::new());
        let items = ItemResolver::new(&manifest).resolve(root, BackupMode::FullTree);

        assert_eq!(items, vec!["Drivers", "Prefs.xml"]);
    }

    #[test]
    fn test_full_tree_deep_files_and_sorting() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("Tooling").join("Router").join("Bits")).unwrap();
        fs::write(root.join("Tooling").join("Router").join("Bits").join("t.tl"), "t").unwrap();
        fs::write(root.join("Tooling").join("other.tl"), "o").unwrap();
        fs::create_dir_all(root.join("Cutters").join("Empty")).unwrap();
        fs::write(root.join("Cutters").join("c.ctr"), "c").unwrap();

        let manifest = ItemManifest::new(["ignored"]);
        let items = ItemResolver::new(&manifest).resolve(root, BackupMode::FullTree);

        assert_eq!(items, vec!["Cutters", "Tooling"]);
    }

    #[test]
    fn test_full_tree_of_empty_installation() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("Logs").join("Old")).unwrap();

        let manifest = ItemManifest::new(["A"]);
        let items = ItemResolver::new(&manifest).resolve(temp_dir.path(), BackupMode::FullTree);

        assert!(items.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_full_tree_keeps_linked_entries() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(outside.path().join("shared.cfg"), "cfg").unwrap();
        fs::create_dir_all(root.join("Config")).unwrap();
        symlink(outside.path().join("shared.cfg"), root.join("Config").join("shared.cfg")).unwrap();
        symlink(outside.path(), root.join("Shared")).unwrap();

        let manifest = ItemManifest::new(Vec::<String>::new());
        let items = ItemResolver::new(&manifest).resolve(root, BackupMode::FullTree);

        assert_eq!(items, vec!["Config", "Shared"]);
    }
}
