use crate::error::{BackupError, Result};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

#[derive(Debug, Clone)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// `<prefix>_<label>_<timestamp>.zip`
pub fn archive_file_name(prefix: &str, label: &str, timestamp: &str) -> String {
    format!(
        "{}_{}_{}.zip",
        sanitize_component(prefix),
        sanitize_component(label),
        timestamp
    )
}

/// Compresses everything under `source_root` into a zip at `archive_path`,
/// creating the parent directory if needed. A partially written archive is
/// removed before the error is returned.
pub fn create_archive(source_root: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent).map_err(|e| archive_error(archive_path, e))?;
    }

    match write_zip(source_root, archive_path) {
        Ok(summary) => {
            info!(
                "Wrote {} ({} files, {} bytes)",
                archive_path.display(),
                summary.files,
                summary.bytes
            );
            Ok(summary)
        }
        Err(err) => {
            let _ = fs::remove_file(archive_path);
            Err(err)
        }
    }
}

fn write_zip(source_root: &Path, archive_path: &Path) -> Result<ArchiveSummary> {
    let file = fs::File::create(archive_path).map_err(|e| archive_error(archive_path, e))?;
    let mut zip = ZipWriter::new(file);

    let file_options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);
    let dir_options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let mut summary = ArchiveSummary {
        path: archive_path.to_path_buf(),
        files: 0,
        directories: 0,
        bytes: 0,
    };

    for entry in WalkDir::new(source_root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        let name = entry_name(relative);

        if entry.file_type().is_dir() {
            zip.add_directory(name, dir_options)
                .map_err(|e| archive_error(archive_path, e))?;
            summary.directories += 1;
        } else if entry.file_type().is_file() {
            zip.start_file(name, file_options)
                .map_err(|e| archive_error(archive_path, e))?;
            let mut source = fs::File::open(entry.path()).map_err(|e| archive_error(archive_path, e))?;
            summary.bytes += io::copy(&mut source, &mut zip).map_err(|e| archive_error(archive_path, e))?;
            summary.files += 1;
        }
    }

    zip.finish().map_err(|e| archive_error(archive_path, e))?;

    Ok(summary)
}

/// Zip entry names always use `/`, whatever the host separator.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn archive_error<E: std::fmt::Display>(path: &Path, error: E) -> BackupError {
    BackupError::ArchiveFailed {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

fn sanitize_component(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '/' | '\\' => '_',
            c if c.is_control() => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim_matches(|c| c == '.' || c == '_');

    if sanitized.is_empty() {
        "unnamed".to_string()
    } else {
        sanitized.to_string()
    }
}
