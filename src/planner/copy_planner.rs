use crate::planner::exclusion::ExclusionFilter;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// One file to copy. `destination` is relative to the installation's
/// backup subfolder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl CopyTask {
    pub fn display_name(&self) -> String {
        self.destination.display().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// A resolved item does not exist under the installation root
    ItemMissing { item: String },
    /// Part of an item's tree could not be enumerated
    Unreadable { path: String, reason: String },
    /// A symbolic link inside a directory item that does not point at a file
    LinkNotFollowed { path: String },
    /// A flattened file item whose name is already taken in the subfolder
    NameConflict { item: String, destination: String },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanWarning::ItemMissing { item } => write!(f, "Item not found: {}", item),
            PlanWarning::Unreadable { path, reason } => {
                write!(f, "Could not read {}: {}", path, reason)
            }
            PlanWarning::LinkNotFollowed { path } => {
                write!(f, "Symbolic link not followed: {}", path)
            }
            PlanWarning::NameConflict { item, destination } => {
                write!(f, "Skipped {}: {} is already taken", item, destination)
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CopyPlan {
    pub tasks: Vec<CopyTask>,
    pub warnings: Vec<PlanWarning>,
    pub excluded_files: usize,
}

impl CopyPlan {
    pub fn missing_items(&self) -> Vec<String> {
        self.warnings
            .iter()
            .filter_map(|w| match w {
                PlanWarning::ItemMissing { item } => Some(item.clone()),
                _ => None,
            })
            .collect()
    }
}

/// Expands resolved item names into concrete file copies.
///
/// Directory items keep their own name as the first destination segment;
/// standalone file items land directly in the backup subfolder.
pub struct CopyPlanner<'a> {
    exclusions: &'a ExclusionFilter,
}

impl<'a> CopyPlanner<'a> {
    pub fn new(exclusions: &'a ExclusionFilter) -> Self {
        Self { exclusions }
    }

    pub fn plan(&self, installation_root: &Path, items: &[String]) -> CopyPlan {
        let mut plan = CopyPlan::default();

        for item in items {
            let source = installation_root.join(item);

            if source.is_dir() {
                self.plan_directory(installation_root, &source, &mut plan);
            } else if source.is_file() {
                self.plan_file(item, &source, &mut plan);
            } else {
                warn!(
                    "Item '{}' not found in {}",
                    item,
                    installation_root.display()
                );
                plan.warnings.push(PlanWarning::ItemMissing { item: item.clone() });
            }
        }

        plan
    }

    fn plan_directory(&self, installation_root: &Path, directory: &Path, plan: &mut CopyPlan) {
        let walker = WalkDir::new(directory)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .unwrap_or(directory)
                        .display()
                        .to_string();
                    warn!("Cannot enumerate {}: {}", path, err);
                    plan.warnings.push(PlanWarning::Unreadable {
                        path,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.path_is_symlink() {
                // Links to files are copied like files; anything else is reported
                if !entry.path().is_file() {
                    warn!("Not following link {}", entry.path().display());
                    plan.warnings.push(PlanWarning::LinkNotFollowed {
                        path: entry.path().display().to_string(),
                    });
                    continue;
                }
            } else if !entry.file_type().is_file() {
                continue;
            }

            if self.exclusions.is_excluded(entry.path()) {
                debug!("Excluding {}", entry.path().display());
                plan.excluded_files += 1;
                continue;
            }

            // WalkDir only yields paths under `directory`, itself under the root
            let Ok(relative) = entry.path().strip_prefix(installation_root) else {
                continue;
            };

            plan.tasks.push(CopyTask {
                source: entry.path().to_path_buf(),
                destination: relative.to_path_buf(),
            });
        }
    }

    fn plan_file(&self, item: &str, file: &Path, plan: &mut CopyPlan) {
        if self.exclusions.is_excluded(file) {
            debug!("Excluding {}", file.display());
            plan.excluded_files += 1;
            return;
        }

        let Some(file_name) = file.file_name() else {
            return;
        };

        let destination = PathBuf::from(file_name);
        if plan.tasks.iter().any(|task| task.destination == destination) {
            warn!(
                "Skipping {}: {} is already planned",
                item,
                destination.display()
            );
            plan.warnings.push(PlanWarning::NameConflict {
                item: item.to_string(),
                destination: destination.display().to_string(),
            });
            return;
        }

        plan.tasks.push(CopyTask {
            source: file.to_path_buf(),
            destination,
        });
    }
}
