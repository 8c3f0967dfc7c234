use crate::backup::progress::{ProgressSnapshot, ProgressTracker};
use crate::backup::staging::{StagingArea, SubfolderNames};
use crate::error::Result;
use crate::planner::{
    BackupMode, CopyPlan, CopyPlanner, CopyTask, ExclusionFilter, ItemManifest, ItemResolver,
    PlanWarning,
};
use crate::scanner::InstallationPath;
use crate::ui::GracefulShutdown;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// Everything decided for one installation before any file is copied.
#[derive(Debug, Clone)]
pub struct InstallationPlan {
    pub installation: InstallationPath,
    pub subfolder: String,
    pub items: Vec<String>,
    pub copy_plan: CopyPlan,
}

impl InstallationPlan {
    pub fn task_count(&self) -> usize {
        self.copy_plan.tasks.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CopyFailure {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallationReport {
    pub name: String,
    pub source_path: String,
    pub subfolder: String,
    pub items: Vec<String>,
    pub files_planned: usize,
    pub files_copied: usize,
    pub files_excluded: usize,
    pub bytes_copied: u64,
    pub missing_items: Vec<String>,
    pub unreadable_paths: Vec<String>,
    pub skipped_entries: Vec<String>,
    pub copy_failures: Vec<CopyFailure>,
}

impl InstallationReport {
    fn from_plan(plan: &InstallationPlan) -> Self {
        let unreadable_paths = plan
            .copy_plan
            .warnings
            .iter()
            .filter_map(|w| match w {
                PlanWarning::Unreadable { path, .. } => Some(path.clone()),
                _ => None,
            })
            .collect();
        let skipped_entries = plan
            .copy_plan
            .warnings
            .iter()
            .filter(|w| {
                matches!(
                    w,
                    PlanWarning::LinkNotFollowed { .. } | PlanWarning::NameConflict { .. }
                )
            })
            .map(|w| w.to_string())
            .collect();

        Self {
            name: plan.installation.name.clone(),
            source_path: plan.installation.display_path(),
            subfolder: plan.subfolder.clone(),
            items: plan.items.clone(),
            files_planned: plan.task_count(),
            files_copied: 0,
            files_excluded: plan.copy_plan.excluded_files,
            bytes_copied: 0,
            missing_items: plan.copy_plan.missing_items(),
            unreadable_paths,
            skipped_entries,
            copy_failures: Vec::new(),
        }
    }

    pub fn warning_count(&self) -> usize {
        self.missing_items.len()
            + self.unreadable_paths.len()
            + self.skipped_entries.len()
            + self.copy_failures.len()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupReport {
    pub mode: BackupMode,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub installations: Vec<InstallationReport>,
}

impl BackupReport {
    pub fn files_planned(&self) -> usize {
        self.installations.iter().map(|i| i.files_planned).sum()
    }

    pub fn files_copied(&self) -> usize {
        self.installations.iter().map(|i| i.files_copied).sum()
    }

    pub fn files_failed(&self) -> usize {
        self.installations.iter().map(|i| i.copy_failures.len()).sum()
    }

    pub fn bytes_copied(&self) -> u64 {
        self.installations.iter().map(|i| i.bytes_copied).sum()
    }

    pub fn has_warnings(&self) -> bool {
        self.installations.iter().any(|i| i.warning_count() > 0)
    }

    /// Flat, human-readable list of every non-fatal problem in the run.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for install in &self.installations {
            for item in &install.missing_items {
                warnings.push(format!("{}: item not found: {}", install.name, item));
            }
            for path in &install.unreadable_paths {
                warnings.push(format!("{}: could not read {}", install.name, path));
            }
            for skipped in &install.skipped_entries {
                warnings.push(format!("{}: {}", install.name, skipped));
            }
            for failure in &install.copy_failures {
                warnings.push(format!(
                    "{}: failed to copy {}: {}",
                    install.name, failure.source, failure.reason
                ));
            }
        }
        warnings
    }
}

/// Resolves, plans and copies each selected installation into the staging
/// tree. Every installation is planned before the first copy so the progress
/// total is final when copying starts.
pub struct BackupOrchestrator<'a> {
    mode: BackupMode,
    manifest: &'a ItemManifest,
    exclusions: &'a ExclusionFilter,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> BackupOrchestrator<'a> {
    pub fn new(mode: BackupMode, manifest: &'a ItemManifest, exclusions: &'a ExclusionFilter) -> Self {
        Self {
            mode,
            manifest,
            exclusions,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn plan_installation(&self, installation: &InstallationPath, subfolder: String) -> InstallationPlan {
        let items = ItemResolver::new(self.manifest).resolve(&installation.path, self.mode);
        let copy_plan = CopyPlanner::new(self.exclusions).plan(&installation.path, &items);

        info!(
            "Planned {} files from {} ({} items, {} excluded)",
            copy_plan.tasks.len(),
            installation.display_path(),
            items.len(),
            copy_plan.excluded_files
        );

        InstallationPlan {
            installation: installation.clone(),
            subfolder,
            items,
            copy_plan,
        }
    }

    pub fn plan_all(
        &self,
        installations: &[InstallationPath],
        names: &mut SubfolderNames,
    ) -> Vec<InstallationPlan> {
        installations
            .iter()
            .map(|installation| {
                let subfolder = names.reserve(&installation.name);
                self.plan_installation(installation, subfolder)
            })
            .collect()
    }

    pub fn run(
        &self,
        installations: &[InstallationPath],
        staging: &mut StagingArea,
        progress_callback: Option<&dyn Fn(&ProgressSnapshot, &CopyTask)>,
    ) -> Result<BackupReport> {
        let plans = self.plan_all(installations, staging.subfolder_names());

        let mut tracker = ProgressTracker::new();
        for plan in &plans {
            tracker.add_planned(plan.task_count());
        }

        self.execute(&plans, staging.path(), &mut tracker, progress_callback)
    }

    /// Copies every planned task. Each installation gets its subfolder even
    /// when nothing in it is copied. Individual copy failures are recorded and
    /// still count as processed; only a shutdown request stops the loop.
    pub fn execute(
        &self,
        plans: &[InstallationPlan],
        staging_root: &Path,
        tracker: &mut ProgressTracker,
        progress_callback: Option<&dyn Fn(&ProgressSnapshot, &CopyTask)>,
    ) -> Result<BackupReport> {
        let started_at = Local::now();
        let start = Instant::now();
        let mut reports = Vec::with_capacity(plans.len());

        for plan in plans {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            let mut report = InstallationReport::from_plan(plan);
            let destination_root = staging_root.join(&plan.subfolder);
            fs::create_dir_all(&destination_root)?;

            for task in &plan.copy_plan.tasks {
                if let Some(shutdown) = self.shutdown {
                    shutdown.check_shutdown()?;
                }

                let destination = destination_root.join(&task.destination);
                match copy_file(&task.source, &destination) {
                    Ok(bytes) => {
                        report.files_copied += 1;
                        report.bytes_copied += bytes;
                    }
                    Err(err) => {
                        warn!("Failed to copy {}: {}", task.source.display(), err);
                        report.copy_failures.push(CopyFailure {
                            source: task.source.display().to_string(),
                            reason: err.to_string(),
                        });
                    }
                }

                let snapshot = tracker.record_completed();
                if let Some(callback) = progress_callback {
                    callback(&snapshot, task);
                }
            }

            reports.push(report);
        }

        Ok(BackupReport {
            mode: self.mode,
            started_at,
            duration: start.elapsed(),
            installations: reports,
        })
    }
}

/// Whole-file copy that creates missing parent directories and keeps the
/// source modification time. Data goes to a temp file next to `dest` that is
/// renamed into place only once complete, so a failed copy leaves nothing.
pub fn copy_file(source: &Path, dest: &Path) -> std::io::Result<u64> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut source_file = fs::File::open(source)?;
    let mut partial = NamedTempFile::new_in(parent)?;

    let total_bytes = io::copy(&mut source_file, partial.as_file_mut())?;
    partial.as_file().sync_all()?;
    partial.persist(dest).map_err(|err| err.error)?;

    if let Ok(modified) = fs::metadata(source).and_then(|m| m.modified()) {
        let _ = filetime::set_file_mtime(dest, filetime::FileTime::from_system_time(modified));
    }

    Ok(total_bytes)
}
