use crate::config::DiscoveryConfig;
use crate::scanner::pattern::PatternSet;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A directory recognised as an installation by its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationPath {
    pub path: PathBuf,
    pub name: String,
}

impl InstallationPath {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Self { path, name }
    }

    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }
}

pub struct InstallationScanner {
    roots: Vec<PathBuf>,
    patterns: PatternSet,
}

impl InstallationScanner {
    pub fn new(config: &DiscoveryConfig) -> Self {
        Self {
            roots: config.roots.clone(),
            patterns: PatternSet::new(config.patterns.iter().cloned()),
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Walks every root exactly two levels deep and returns matching
    /// directories in discovery order: root order, then level-1 order, with
    /// each level-1 match followed by its own level-2 matches.
    pub fn scan(&self) -> Vec<InstallationPath> {
        let mut installations = Vec::new();

        for root in &self.roots {
            if !root.exists() {
                debug!("Skipping absent root {}", root.display());
                continue;
            }

            let Some(level_one) = list_subdirectories(root) else {
                continue;
            };

            for dir in level_one {
                if self.name_matches(&dir) {
                    debug!("Installation found: {}", dir.display());
                    installations.push(InstallationPath::new(&dir));
                }

                let Some(level_two) = list_subdirectories(&dir) else {
                    continue;
                };

                for nested in level_two {
                    if self.name_matches(&nested) {
                        debug!("Installation found: {}", nested.display());
                        installations.push(InstallationPath::new(nested));
                    }
                }
            }
        }

        installations
    }

    fn name_matches(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.patterns.matches(name))
    }
}

/// Immediate subdirectories of `dir`, sorted by name so repeated scans of the
/// same tree number their menu entries identically. `None` when the directory
/// cannot be listed.
fn list_subdirectories(dir: &Path) -> Option<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            if err.kind() == std::io::ErrorKind::PermissionDenied {
                warn!("Permission denied listing {}", dir.display());
            } else {
                debug!("Cannot list {}: {}", dir.display(), err);
            }
            return None;
        }
    };

    let mut subdirectories: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.path())
        .collect();

    subdirectories.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Some(subdirectories)
}
