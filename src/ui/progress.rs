use crate::backup::ProgressSnapshot;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    pub fn create_copy_progress(&self, total_files: u64) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_files));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} files {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message("Copying files...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub fn create_spinner(&self, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new_spinner());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        pb.set_message(message.to_string());
        pb
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

pub fn update_copy_progress(pb: &ProgressBar, snapshot: &ProgressSnapshot, current_file: &str) {
    if pb.length() != Some(snapshot.total as u64) {
        pb.set_length(snapshot.total as u64);
    }
    pb.set_position(snapshot.completed as u64);
    pb.set_message(progress_message(snapshot, current_file));
}

/// `42% ETA 1m 5s Drivers/x.bin`, without the ETA until one file is done.
pub fn progress_message(snapshot: &ProgressSnapshot, current_file: &str) -> String {
    let eta = if snapshot.completed > 0 && snapshot.estimated_remaining.as_secs() > 0 {
        format!(" ETA {}", format_duration(snapshot.estimated_remaining))
    } else {
        String::new()
    };

    format!("{:>3}%{} {}", snapshot.percent, eta, current_file)
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(completed: usize, total: usize, percent: u8, eta_secs: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            completed,
            total,
            percent,
            elapsed: Duration::from_secs(1),
            estimated_remaining: Duration::from_secs(eta_secs),
        }
    }

    #[test]
    fn test_progress_manager_creation() {
        let manager = ProgressManager::new(true);
        assert!(manager.is_enabled());

        let disabled_manager = ProgressManager::new(false);
        assert!(!disabled_manager.is_enabled());
    }

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);

        assert!(manager.create_copy_progress(100).is_hidden());
        assert!(manager.create_spinner("Scanning").is_hidden());
    }

    #[test]
    fn test_progress_bar_follows_growing_total() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_copy_progress(2);

        update_copy_progress(&pb, &snapshot(1, 4, 25, 3), "Prefs.xml");

        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 1);
    }

    #[test]
    fn test_progress_message() {
        assert_eq!(progress_message(&snapshot(0, 10, 0, 0), "a.txt"), "  0% a.txt");
        assert_eq!(
            progress_message(&snapshot(5, 10, 50, 90), "Drivers/x.bin"),
            " 50% ETA 1m 30s Drivers/x.bin"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
