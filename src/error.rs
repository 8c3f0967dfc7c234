use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid selection '{input}': {reason}")]
    InvalidSelection { input: String, reason: String },

    #[error("No installations found")]
    NoInstallationsFound {
        roots: Vec<String>,
        patterns: Vec<String>,
    },

    #[error("Staging directory error: {message}")]
    Staging { message: String },

    #[error("Failed to create archive {path}: {message}")]
    ArchiveFailed { path: String, message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl BackupError {
    pub fn invalid_selection<I: Into<String>, R: Into<String>>(input: I, reason: R) -> Self {
        BackupError::InvalidSelection {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for BackupError {
    fn user_message(&self) -> String {
        match self {
            BackupError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            BackupError::InvalidSelection { input, reason } => {
                if input.trim().is_empty() {
                    format!("No selection made: {}", reason)
                } else {
                    format!("Invalid selection '{}': {}", input.trim(), reason)
                }
            }
            BackupError::NoInstallationsFound { roots, patterns } => {
                format!(
                    "No installations matching {} found under {}",
                    patterns.join(", "),
                    roots.join(", ")
                )
            }
            BackupError::Staging { message } => {
                format!("Could not prepare the staging directory: {}", message)
            }
            BackupError::ArchiveFailed { path, message } => {
                format!("Archive {} could not be written: {}", path, message)
            }
            BackupError::Cancelled => "Backup was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BackupError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            BackupError::InvalidSelection { .. } => Some(
                "Enter one of the listed installation numbers or 'all', then 1 (curated) or 2 (full).".to_string()
            ),
            BackupError::NoInstallationsFound { .. } => Some(
                "Point the scan at the drive holding the installation with --root, or widen the name patterns with --pattern.".to_string()
            ),
            BackupError::Staging { .. } => Some(
                "Make sure the system temporary directory exists and has free space.".to_string()
            ),
            BackupError::ArchiveFailed { .. } => Some(
                "Check that the backup directory is writable and has enough free space, or choose another one with --output.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for BackupError {
    fn from(error: toml::de::Error) -> Self {
        BackupError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
