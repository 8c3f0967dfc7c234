use clap::Parser;
use enroute_backup::{
    logging, BackupError, Cli, EnRouteBackup, OutputFormatter, OutputMode, UserFriendlyError,
};
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    logging::init_logging(cli.verbosity_level());

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match EnRouteBackup::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&cli, &e);
            return exit_code_for(&e);
        }
    };

    if cli.dry_run {
        return handle_dry_run(&cli, &app);
    }

    let stdin = std::io::stdin();
    match app.run_interactive(cli.select.as_deref(), cli.mode.as_deref(), stdin.lock()) {
        Ok(summary) => {
            app.output_formatter()
                .print_backup_report(&summary.report, &summary.archive);
            app.output_formatter().success(&format!(
                "Backup written to {}",
                summary.archive.path.display()
            ));

            if summary.has_warnings() {
                2 // Success with warnings
            } else {
                0
            }
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn exit_code_for(error: &BackupError) -> i32 {
    match error {
        BackupError::Cancelled => 130, // Interrupted (SIGINT)
        BackupError::InvalidSelection { .. } => 3,
        BackupError::NoInstallationsFound { .. } => 4,
        BackupError::ArchiveFailed { .. } => 5,
        BackupError::Config { .. } => 6,
        _ => 1,
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "enroute-backup.toml".to_string());

    match EnRouteBackup::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  enroute-backup --config {}", config_path);
            println!("\nEdit the file to list your drives, curated items and backup directory.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(cli: &Cli, app: &EnRouteBackup) -> i32 {
    let formatter = app.output_formatter();

    formatter.info("DRY RUN MODE - nothing will be copied or archived");

    match app.dry_run(cli.select.as_deref(), cli.mode.as_deref()) {
        Ok(dry_run) => {
            formatter.print_dry_run(dry_run.mode, &dry_run.plans);
            formatter.info(&format!(
                "Archive would be written to {}",
                app.config().output.backup_directory.display()
            ));
            0
        }
        Err(e) => {
            app.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(cli: &Cli, error: &BackupError) {
    let formatter = OutputFormatter::new(OutputMode::from(cli.output_format), 0, false);
    formatter.print_user_friendly_error(error);
}
