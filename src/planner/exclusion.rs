use std::collections::BTreeSet;
use std::path::Path;

/// Extensions that are never copied, whatever the backup mode.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    extensions: BTreeSet<String>,
}

impl ExclusionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize_extension(ext.as_ref()))
            .collect();

        Self { extensions }
    }

    /// True when the file's lower-cased extension is in the set. Files
    /// without an extension are never excluded.
    pub fn is_excluded(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .extensions
                .contains(&format!(".{}", ext.to_lowercase())),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

/// Lower-cases and guarantees a single leading `.`; blank input yields `None`.
pub fn normalize_extension(extension: &str) -> Option<String> {
    let trimmed = extension.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{}", trimmed.to_lowercase()))
    }
}
