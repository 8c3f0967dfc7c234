use crate::config::{CliOverrides, Config};
use crate::error::Result;
use crate::ui::OutputMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "enroute-backup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find EnRoute installations and archive their settings")]
#[command(
    long_about = "enroute-backup scans the configured drives for EnRoute/EzyNest installations, \
                  copies the important folders (or every file) of the chosen installation(s) \
                  into a temporary staging area and compresses it into a timestamped zip archive."
)]
#[command(before_help = "📦 EnRoute Backup - Installation Backup Tool")]
#[command(after_help = "EXAMPLES:\n  \
    enroute-backup\n  \
    enroute-backup --select all --mode curated\n  \
    enroute-backup --root /mnt/c,/mnt/d --select 0 --mode full --output /srv/backups\n  \
    enroute-backup --exclude tmp,bak --dry-run\n  \
    enroute-backup --config shop.toml --output-format json")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Directories scanned for installations
    #[arg(short, long, value_delimiter = ',', help = "Root directories to scan (replaces configured roots)")]
    pub root: Option<Vec<PathBuf>>,

    /// Installation name patterns
    #[arg(short, long, value_delimiter = ',', help = "Directory name patterns, '*' is a wildcard (e.g., EnRoute*)")]
    pub pattern: Option<Vec<String>>,

    /// Installation to back up, skipping the menu
    #[arg(short, long, value_name = "INDEX|all", help = "Installation number from the menu, or 'all'")]
    pub select: Option<String>,

    /// Backup mode, skipping the menu
    #[arg(short, long, value_name = "1|2|curated|full", help = "1/curated: important folders only, 2/full: every file")]
    pub mode: Option<String>,

    /// Directory the archive is written to
    #[arg(short, long, help = "Backup output directory (default: ./EnRouteBackups)")]
    pub output: Option<PathBuf>,

    /// Extra extensions never copied
    #[arg(short, long, value_delimiter = ',', help = "Additional file extensions to exclude (e.g., tmp,bak)")]
    pub exclude: Option<Vec<String>>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be done without executing)
    #[arg(long, help = "Show what would be backed up without copying or archiving")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl From<OutputFormat> for OutputMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        }
    }
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_roots(self.root.clone())
            .with_patterns(self.pattern.clone())
            .with_exclude(self.exclude.clone())
            .with_output_dir(self.output.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}
