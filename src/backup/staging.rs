use crate::error::{BackupError, Result};
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;
use tracing::debug;

/// Hands out one staging subfolder name per installation. Repeated leaf
/// names (compared case-insensitively) get `_2`, `_3`, ... so two
/// installations never share a subfolder.
#[derive(Debug, Default)]
pub struct SubfolderNames {
    used: HashMap<String, usize>,
}

impl SubfolderNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reserve(&mut self, leaf_name: &str) -> String {
        let count = self.used.entry(leaf_name.to_lowercase()).or_insert(0);
        *count += 1;

        if *count == 1 {
            leaf_name.to_string()
        } else {
            format!("{}_{}", leaf_name, count)
        }
    }
}

/// Process-private directory that collects copied files before archiving.
///
/// The directory is deleted by [`StagingArea::close`] or, failing that, when
/// the value is dropped, so every exit path cleans up.
pub struct StagingArea {
    dir: TempDir,
    names: SubfolderNames,
}

impl StagingArea {
    /// Creates `<prefix>_<timestamp>_XXXXXX` under `parent`, normally the
    /// system temp directory.
    pub fn create_in<P: AsRef<Path>>(parent: P, prefix: &str, timestamp: &str) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("{}_{}_", prefix, timestamp))
            .tempdir_in(parent.as_ref())
            .map_err(|e| BackupError::Staging {
                message: format!(
                    "cannot create staging directory in {}: {}",
                    parent.as_ref().display(),
                    e
                ),
            })?;

        debug!("Staging directory: {}", dir.path().display());

        Ok(Self {
            dir,
            names: SubfolderNames::new(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn subfolder_names(&mut self) -> &mut SubfolderNames {
        &mut self.names
    }

    /// Removes the staging tree, reporting failures instead of ignoring them.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().display().to_string();
        self.dir.close().map_err(|e| BackupError::Staging {
            message: format!("cannot remove {}: {}", path, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_staging_name_carries_prefix_and_timestamp() {
        let parent = TempDir::new().unwrap();
        let staging = StagingArea::create_in(parent.path(), "enroute_backup", "20240102_030405").unwrap();

        let name = staging.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("enroute_backup_20240102_030405_"));
        assert!(staging.path().starts_with(parent.path()));
    }

    #[test]
    fn test_missing_parent_is_staging_error() {
        let parent = TempDir::new().unwrap();
        let result = StagingArea::create_in(parent.path().join("gone"), "stage", "ts");
        assert!(matches!(result, Err(BackupError::Staging { .. })));
    }

    #[test]
    fn test_close_removes_tree() {
        let parent = TempDir::new().unwrap();
        let staging = StagingArea::create_in(parent.path(), "stage", "ts").unwrap();
        let path = staging.path().to_path_buf();
        fs::create_dir_all(path.join("EnRoute9").join("Drivers")).unwrap();
        fs::write(path.join("EnRoute9").join("Drivers").join("x.bin"), "x").unwrap();

        staging.close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_removes_tree() {
        let parent = TempDir::new().unwrap();
        let path = {
            let staging = StagingArea::create_in(parent.path(), "stage", "ts").unwrap();
            fs::write(staging.path().join("file.txt"), "x").unwrap();
            staging.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_duplicate_leaf_names_get_suffixes() {
        let mut names = SubfolderNames::new();

        assert_eq!(names.reserve("EnRoute6"), "EnRoute6");
        assert_eq!(names.reserve("EzyNest"), "EzyNest");
        assert_eq!(names.reserve("EnRoute6"), "EnRoute6_2");
        assert_eq!(names.reserve("enroute6"), "enroute6_3");
    }
}
