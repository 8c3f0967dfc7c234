use crate::error::{BackupError, Result};
use crate::planner::exclusion::normalize_extension;
use crate::planner::{ExclusionFilter, ItemManifest};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub backup: BackupConfig,
    pub output: OutputConfig,
}

/// Where to look for installations and which directory names count as one.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub roots: Vec<PathBuf>,
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackupConfig {
    pub curated_items: Vec<String>,
    pub excluded_extensions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub backup_directory: PathBuf,
    pub archive_prefix: String,
    pub staging_prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            roots: vec![default_root()],
            patterns: vec!["EnRoute*".to_string(), "EzyNest*".to_string()],
        }
    }
}

#[cfg(windows)]
fn default_root() -> PathBuf {
    PathBuf::from("C:\\")
}

#[cfg(not(windows))]
fn default_root() -> PathBuf {
    PathBuf::from("/")
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            curated_items: vec![
                "Drivers".to_string(),
                "Cutters".to_string(),
                "Tooling".to_string(),
                "Profiles".to_string(),
                "Templates".to_string(),
                "Prefs.xml".to_string(),
            ],
            excluded_extensions: vec![".exe".to_string(), ".dll".to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            backup_directory: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("EnRouteBackups"),
            archive_prefix: "EnRoute_Backup".to_string(),
            staging_prefix: "enroute_backup".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BackupError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BackupError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let mut config: Config = toml::from_str(&content).map_err(|e| BackupError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;
        config.normalize_extensions();

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["enroute-backup.toml", ".enroute-backup.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref roots) = cli_args.roots {
            self.discovery.roots = roots.clone();
        }

        if let Some(ref patterns) = cli_args.patterns {
            self.discovery.patterns = patterns
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect();
        }

        if let Some(ref exclude) = cli_args.exclude {
            self.backup.excluded_extensions.extend(exclude.iter().cloned());
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.backup_directory = output_dir.clone();
        }

        self.normalize_extensions();
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| BackupError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| BackupError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.discovery.roots.is_empty() {
            return Err(config_error("At least one discovery root must be specified"));
        }

        if self.discovery.patterns.is_empty() {
            return Err(config_error("At least one installation name pattern must be specified"));
        }

        if self.discovery.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(config_error("Installation name patterns cannot be blank"));
        }

        if self.backup.curated_items.is_empty() {
            return Err(config_error("The curated item list cannot be empty"));
        }

        for item in &self.backup.curated_items {
            validate_curated_item(item)?;
        }

        if let Some(ext) = self
            .backup
            .excluded_extensions
            .iter()
            .find(|ext| normalize_extension(ext).is_none())
        {
            return Err(config_error(&format!("Invalid excluded extension '{}'", ext)));
        }

        if self.output.archive_prefix.trim().is_empty() {
            return Err(config_error("Archive prefix cannot be empty"));
        }

        if self.output.staging_prefix.trim().is_empty() {
            return Err(config_error("Staging prefix cannot be empty"));
        }

        Ok(())
    }

    pub fn manifest(&self) -> ItemManifest {
        ItemManifest::new(self.backup.curated_items.iter().cloned())
    }

    pub fn exclusion_filter(&self) -> ExclusionFilter {
        ExclusionFilter::new(&self.backup.excluded_extensions)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }

    // Blank entries are left alone so validate() can reject them.
    fn normalize_extensions(&mut self) {
        let mut normalized: Vec<String> = Vec::new();
        for ext in &self.backup.excluded_extensions {
            let ext = normalize_extension(ext).unwrap_or_else(|| ext.clone());
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }
        self.backup.excluded_extensions = normalized;
    }
}

fn config_error(message: &str) -> BackupError {
    BackupError::Config {
        message: message.to_string(),
    }
}

fn validate_curated_item(item: &str) -> Result<()> {
    let path = Path::new(item);

    if item.trim().is_empty() {
        return Err(config_error("Curated items cannot be blank"));
    }

    let escapes = path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

    if escapes {
        return Err(config_error(&format!(
            "Curated item '{}' must be a relative path inside the installation",
            item
        )));
    }

    Ok(())
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub roots: Option<Vec<PathBuf>>,
    pub patterns: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roots(mut self, roots: Option<Vec<PathBuf>>) -> Self {
        self.roots = roots;
        self
    }

    pub fn with_patterns(mut self, patterns: Option<Vec<String>>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_exclude(mut self, exclude: Option<Vec<String>>) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.discovery.roots.len(), 1);
        assert_eq!(config.discovery.patterns, vec!["EnRoute*", "EzyNest*"]);
        assert!(config.backup.curated_items.contains(&"Prefs.xml".to_string()));
        assert_eq!(config.backup.excluded_extensions, vec![".exe", ".dll"]);
        assert!(config.output.backup_directory.ends_with("EnRouteBackups"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.discovery.patterns = vec!["  ".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.backup.curated_items.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.discovery.roots.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_curated_items_must_stay_inside_installation() {
        for bad in ["../Secrets", "Drivers/../../etc", "/etc/passwd", ""] {
            let mut config = Config::default();
            config.backup.curated_items = vec![bad.to_string()];
            assert!(config.validate().is_err(), "should reject {:?}", bad);
        }

        let mut config = Config::default();
        config.backup.curated_items = vec!["Settings/Machine.ini".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_operations() {
        let mut config = Config::default();
        config.output.archive_prefix = "Shop_Backup".to_string();
        let temp_file = NamedTempFile::new().unwrap();

        config.save_to_file(temp_file.path()).unwrap();

        let loaded_config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(loaded_config.output.archive_prefix, "Shop_Backup");
        assert_eq!(loaded_config.discovery.patterns, config.discovery.patterns);
    }

    #[test]
    fn test_partial_file_keeps_defaults_and_normalizes_extensions() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            "[backup]\nexcluded_extensions = [\"EXE\", \".Tmp\", \".exe\"]\n\n[discovery]\nroots = [\"/mnt/c\"]"
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.backup.excluded_extensions, vec![".exe", ".tmp"]);
        assert_eq!(config.discovery.roots, vec![PathBuf::from("/mnt/c")]);
        assert_eq!(config.discovery.patterns, vec!["EnRoute*", "EzyNest*"]);
        assert_eq!(config.backup.curated_items.len(), 6);
    }

    #[test]
    fn test_missing_or_broken_file_is_config_error() {
        assert!(matches!(
            Config::load_from_file("/definitely/not/here.toml"),
            Err(BackupError::Config { .. })
        ));

        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[discovery\nroots = 3").unwrap();
        assert!(matches!(
            Config::load_from_file(temp_file.path()),
            Err(BackupError::Config { .. })
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        let overrides = CliOverrides::new()
            .with_roots(Some(vec![PathBuf::from("/mnt/d")]))
            .with_patterns(Some(vec!["Shop*".to_string(), " ".to_string()]))
            .with_exclude(Some(vec!["TMP".to_string()]))
            .with_output_dir(Some(PathBuf::from("/srv/backups")));

        config.merge_with_cli_args(&overrides);

        assert_eq!(config.discovery.roots, vec![PathBuf::from("/mnt/d")]);
        assert_eq!(config.discovery.patterns, vec!["Shop*"]);
        assert_eq!(config.backup.excluded_extensions, vec![".exe", ".dll", ".tmp"]);
        assert_eq!(config.output.backup_directory, PathBuf::from("/srv/backups"));
    }

    #[test]
    fn test_manifest_and_filter_follow_config() {
        let config = Config::default();
        assert_eq!(config.manifest().len(), 6);

        let filter = config.exclusion_filter();
        assert!(filter.is_excluded(Path::new("EnRoute.EXE")));
        assert!(!filter.is_excluded(Path::new("Prefs.xml")));
    }

    #[test]
    fn test_sample_config_generation() {
        let sample = Config::create_sample_config();
        assert!(sample.contains("[discovery]"));
        assert!(sample.contains("[backup]"));
        assert!(sample.contains("[output]"));
        assert!(toml::from_str::<Config>(&sample).is_ok());
    }
}
