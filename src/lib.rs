pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod planner;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{BackupConfig, CliOverrides, Config, DiscoveryConfig, OutputConfig};
pub use error::{BackupError, Result, UserFriendlyError};

// Core functionality re-exports
pub use backup::{
    ArchiveSummary, BackupOrchestrator, BackupReport, InstallationPlan, InstallationReport,
    ProgressSnapshot, ProgressTracker, StagingArea,
};
pub use planner::{
    BackupMode, CopyPlan, CopyPlanner, CopyTask, ExclusionFilter, ItemManifest, ItemResolver,
    PlanWarning,
};
pub use scanner::{InstallationPath, InstallationScanner, PatternSet};
pub use ui::{
    GracefulShutdown, InstallationChoice, OutputFormatter, OutputMode, ProgressManager, Prompter,
};

use backup::{archive_file_name, create_archive, SubfolderNames};
use chrono::Local;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a completed backup run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report: BackupReport,
    pub archive: ArchiveSummary,
}

impl RunSummary {
    pub fn has_warnings(&self) -> bool {
        self.report.has_warnings()
    }
}

/// What a run would copy, without touching the disk.
#[derive(Debug, Clone)]
pub struct DryRunPlan {
    pub mode: BackupMode,
    pub plans: Vec<InstallationPlan>,
}

impl DryRunPlan {
    pub fn total_files(&self) -> usize {
        self.plans.iter().map(|p| p.task_count()).sum()
    }
}

/// Main library interface: discovery, operator choices, staging and archiving.
pub struct EnRouteBackup {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
    staging_parent: PathBuf,
}

impl EnRouteBackup {
    /// Create a new instance with the provided configuration. Installs the
    /// Ctrl+C handler, so call it once per process.
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let shutdown = GracefulShutdown::new()?;
        Ok(Self::with_shutdown(config, output_mode, verbose, quiet, shutdown))
    }

    /// Create an instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self::with_shutdown(
            config,
            output_mode,
            verbose,
            quiet,
            GracefulShutdown::new_for_test(),
        )
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        verbose: u8,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Self {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);

        Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
            staging_parent: std::env::temp_dir(),
        }
    }

    /// Create an instance from CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        Self::new(
            config,
            cli_args.output_format.into(),
            cli_args.verbosity_level(),
            cli_args.quiet,
        )
    }

    /// Directory the staging tree is created in (system temp by default).
    pub fn with_staging_parent<P: Into<PathBuf>>(mut self, parent: P) -> Self {
        self.staging_parent = parent.into();
        self
    }

    /// Scans the configured roots. Finding nothing is an error.
    pub fn discover_installations(&self) -> Result<Vec<InstallationPath>> {
        self.output_formatter.start_operation("Searching for installations");

        let spinner = self.progress_manager.create_spinner("Scanning drives...");
        let scanner = InstallationScanner::new(&self.config.discovery);
        let installations = scanner.scan();
        spinner.finish_and_clear();

        if installations.is_empty() {
            return Err(BackupError::NoInstallationsFound {
                roots: scanner.roots().iter().map(|r| r.display().to_string()).collect(),
                patterns: scanner.patterns().patterns().to_vec(),
            });
        }

        info!("Found {} installation(s)", installations.len());
        Ok(installations)
    }

    /// Full operator flow. Answers missing from `selection` / `mode` are read
    /// from `input`. Both answers are validated before anything is written.
    pub fn run_interactive<R: BufRead>(
        &self,
        selection: Option<&str>,
        mode: Option<&str>,
        input: R,
    ) -> Result<RunSummary> {
        let installations = self.discover_installations()?;
        let mut prompter = Prompter::new(input, std::io::stdout());

        let choice = match selection {
            Some(answer) => InstallationChoice::parse(answer, installations.len())?,
            None => {
                self.output_formatter.print_installation_menu(&installations);
                let answer = prompter.ask("Select installation number or 'all': ")?;
                InstallationChoice::parse(&answer, installations.len())?
            }
        };

        let mode = match mode {
            Some(answer) => BackupMode::parse(answer)?,
            None => {
                self.output_formatter.print_mode_menu();
                let answer = prompter.ask("Select backup mode [1/2]: ")?;
                BackupMode::parse(&answer)?
            }
        };

        let selected = choice.select(&installations);
        let label = choice.archive_label(&installations);

        self.backup(&selected, mode, &label)
    }

    /// Stages the given installations, archives the staging tree and removes
    /// it again, whatever the outcome.
    pub fn backup(
        &self,
        installations: &[InstallationPath],
        mode: BackupMode,
        label: &str,
    ) -> Result<RunSummary> {
        self.shutdown.check_shutdown()?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut staging = StagingArea::create_in(
            &self.staging_parent,
            &self.config.output.staging_prefix,
            &timestamp,
        )?;

        let result = self.stage_and_archive(installations, mode, label, &timestamp, &mut staging);

        if let Err(e) = staging.close() {
            warn!("{}", e);
            self.output_formatter.warning(&e.user_message());
        }

        result
    }

    fn stage_and_archive(
        &self,
        installations: &[InstallationPath],
        mode: BackupMode,
        label: &str,
        timestamp: &str,
        staging: &mut StagingArea,
    ) -> Result<RunSummary> {
        let manifest = self.config.manifest();
        let exclusions = self.config.exclusion_filter();
        let orchestrator =
            BackupOrchestrator::new(mode, &manifest, &exclusions).with_shutdown(&self.shutdown);

        self.output_formatter.start_operation(&format!(
            "Backing up {} installation(s): {}",
            installations.len(),
            mode.describe()
        ));

        let copy_progress = self.progress_manager.create_copy_progress(0);
        let progress_callback = |snapshot: &ProgressSnapshot, task: &CopyTask| {
            ui::progress::update_copy_progress(&copy_progress, snapshot, &task.display_name());
        };

        let report = match orchestrator.run(installations, staging, Some(&progress_callback)) {
            Ok(report) => report,
            Err(e) => {
                copy_progress.abandon();
                return Err(e);
            }
        };

        ui::progress::finish_progress_with_summary(
            &copy_progress,
            &format!("Copied {} files", report.files_copied()),
            report.duration,
        );

        self.shutdown.check_shutdown()?;

        let archive_path = self
            .config
            .output
            .backup_directory
            .join(archive_file_name(&self.config.output.archive_prefix, label, timestamp));

        let spinner = self.progress_manager.create_spinner("Compressing backup...");
        let archive = create_archive(staging.path(), &archive_path);
        spinner.finish_and_clear();

        Ok(RunSummary {
            report,
            archive: archive?,
        })
    }

    /// Scans and plans without creating a staging tree or an archive.
    /// Without a selection every installation is planned; without a mode the
    /// curated item list is used.
    pub fn dry_run(&self, selection: Option<&str>, mode: Option<&str>) -> Result<DryRunPlan> {
        let installations = self.discover_installations()?;

        let selected = match selection {
            Some(answer) => {
                InstallationChoice::parse(answer, installations.len())?.select(&installations)
            }
            None => installations,
        };

        let mode = match mode {
            Some(answer) => BackupMode::parse(answer)?,
            None => BackupMode::CuratedOnly,
        };

        let manifest = self.config.manifest();
        let exclusions = self.config.exclusion_filter();
        let orchestrator = BackupOrchestrator::new(mode, &manifest, &exclusions);
        let plans = orchestrator.plan_all(&selected, &mut SubfolderNames::new());

        Ok(DryRunPlan { mode, plans })
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Check if shutdown has been requested
    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &BackupError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
