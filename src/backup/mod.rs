pub mod archive;
pub mod orchestrator;
pub mod progress;
pub mod staging;

pub use archive::{archive_file_name, create_archive, ArchiveSummary};
pub use orchestrator::{
    BackupOrchestrator, BackupReport, CopyFailure, InstallationPlan, InstallationReport,
};
pub use progress::{ProgressSnapshot, ProgressTracker};
pub use staging::{StagingArea, SubfolderNames};
