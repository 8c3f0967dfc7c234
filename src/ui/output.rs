use crate::backup::{ArchiveSummary, BackupReport, InstallationPlan};
use crate::error::{BackupError, UserFriendlyError};
use crate::planner::BackupMode;
use crate::scanner::InstallationPath;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use serde_json;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");
static PACKAGE: Emoji = Emoji("📦 ", "");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &BackupError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    eprintln!();
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    // Menus. Always shown, even when quiet: the operator has to answer them.
    pub fn print_installation_menu(&self, installations: &[InstallationPath]) {
        match self.mode {
            OutputMode::Json => {
                let entries: Vec<_> = installations
                    .iter()
                    .enumerate()
                    .map(|(index, install)| {
                        serde_json::json!({
                            "index": index,
                            "name": install.name,
                            "path": install.display_path(),
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "installations",
                    "installations": entries
                }));
            }
            _ => {
                println!("Installations found:");
                for (index, install) in installations.iter().enumerate() {
                    if self.use_colors {
                        println!(
                            "  [{}] {}",
                            style(index).cyan().bold(),
                            install.display_path()
                        );
                    } else {
                        println!("  [{}] {}", index, install.display_path());
                    }
                }
                println!("  [all] every installation above");
            }
        }
    }

    pub fn print_mode_menu(&self) {
        match self.mode {
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "modes",
                    "modes": [
                        { "key": "1", "mode": BackupMode::CuratedOnly, "description": BackupMode::CuratedOnly.describe() },
                        { "key": "2", "mode": BackupMode::FullTree, "description": BackupMode::FullTree.describe() },
                    ]
                }));
            }
            _ => {
                println!("Backup mode:");
                println!("  [1] {}", BackupMode::CuratedOnly.describe());
                println!("  [2] {}", BackupMode::FullTree.describe());
            }
        }
    }

    // Summary and reporting
    pub fn print_backup_report(&self, report: &BackupReport, archive: &ArchiveSummary) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report, archive);
                }
            }
            OutputMode::Json => {
                let json_output = serde_json::json!({
                    "type": "report",
                    "archive": archive.path.display().to_string(),
                    "archive_files": archive.files,
                    "archive_bytes": archive.bytes,
                    "files_planned": report.files_planned(),
                    "files_copied": report.files_copied(),
                    "files_failed": report.files_failed(),
                    "bytes_copied": report.bytes_copied(),
                    "duration_ms": report.duration.as_millis() as u64,
                    "warnings": report.warnings(),
                    "report": report,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json_output).unwrap_or_else(|_| "{}".to_string())
                );
            }
            OutputMode::Plain => self.print_plain_report(report, archive),
        }
    }

    pub fn print_dry_run(&self, mode: BackupMode, plans: &[InstallationPlan]) {
        match self.mode {
            OutputMode::Json => {
                let entries: Vec<_> = plans
                    .iter()
                    .map(|plan| {
                        serde_json::json!({
                            "name": plan.installation.name,
                            "path": plan.installation.display_path(),
                            "subfolder": plan.subfolder,
                            "items": plan.items,
                            "files_planned": plan.task_count(),
                            "files_excluded": plan.copy_plan.excluded_files,
                            "missing_items": plan.copy_plan.missing_items(),
                        })
                    })
                    .collect();
                self.print_json_object(&serde_json::json!({
                    "type": "dry_run",
                    "mode": mode,
                    "installations": entries
                }));
            }
            _ => {
                self.print_header(&format!("Dry run ({})", mode.describe()));
                for plan in plans {
                    println!(
                        "{} -> {}: {} files planned, {} excluded",
                        plan.installation.display_path(),
                        plan.subfolder,
                        plan.task_count(),
                        plan.copy_plan.excluded_files
                    );
                    for item in plan.copy_plan.missing_items() {
                        println!("    missing: {}", item);
                    }
                }
                let total: usize = plans.iter().map(|p| p.task_count()).sum();
                println!("Total: {} files", total);
            }
        }
    }

    // Specialized output methods
    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: String) -> String {
        if self.use_colors {
            style(value).cyan().bold().to_string()
        } else {
            value
        }
    }

    fn print_human_report(&self, report: &BackupReport, archive: &ArchiveSummary) {
        println!();
        self.print_separator();

        if self.use_colors {
            println!("{}{}", PACKAGE, style("Backup completed!").green().bold());
        } else {
            println!("✓ Backup completed!");
        }

        println!();
        println!("  Archive:        {}", self.highlight(archive.path.display().to_string()));
        println!("  Mode:           {}", report.mode.describe());
        for install in &report.installations {
            println!(
                "  {:<15} {}/{} files, {}",
                format!("{}:", install.subfolder),
                install.files_copied,
                install.files_planned,
                format_bytes(install.bytes_copied)
            );
        }
        println!(
            "  Files copied:   {}",
            self.highlight(format!("{}/{}", report.files_copied(), report.files_planned()))
        );
        println!("  Archive size:   {}", self.highlight(format_bytes(archive.bytes)));
        println!("  Time taken:     {}", self.highlight(format_duration(report.duration)));

        let warnings = report.warnings();
        if !warnings.is_empty() {
            println!();
            println!("  Warnings ({}):", warnings.len());
            for warning in &warnings {
                println!("    - {}", warning);
            }
        }

        self.print_separator();
    }

    fn print_plain_report(&self, report: &BackupReport, archive: &ArchiveSummary) {
        println!("COMPLETED: Backup");
        println!("Archive: {}", archive.path.display());
        println!("Mode: {}", report.mode);
        println!("Files copied: {}", report.files_copied());
        println!("Files planned: {}", report.files_planned());
        println!("Bytes copied: {}", report.bytes_copied());
        println!("Duration: {:?}", report.duration);
        for warning in report.warnings() {
            println!("WARNING: {}", warning);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_creation() {
        let formatter = OutputFormatter::new(OutputMode::Plain, 1, false);
        assert_eq!(formatter.mode, OutputMode::Plain);
        assert_eq!(formatter.verbose_level, 1);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert_eq!(formatter.verbose_level, 0);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.0 MB");
        assert_eq!(format_bytes(1073741824), "1.0 GB");
    }

    #[test]
    fn test_should_show_message() {
        let formatter = OutputFormatter::new(OutputMode::Human, 1, false);
        assert!(formatter.should_show_message(0));
        assert!(formatter.should_show_message(1));
        assert!(!formatter.should_show_message(2));

        let quiet_formatter = OutputFormatter::new(OutputMode::Human, 2, true);
        assert!(!quiet_formatter.should_show_message(0));
    }
}
