//! Migration file discovery

use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Filename prefix of repeatable migrations, which are exempt from validation
pub const REPEATABLE_PREFIX: &str = "R__";

/// A migration file loaded for validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// Path to the file
    pub path: PathBuf,
    /// Base name, e.g. `V001__init.sql`
    pub filename: String,
    /// Full file content
    pub raw_content: String,
    /// Why the file could not be read, if it could not
    pub read_error: Option<String>,
}

impl MigrationFile {
    /// Build a migration from in-memory content.
    pub fn new(path: impl Into<PathBuf>, raw_content: impl Into<String>) -> Self {
        let path = path.into();
        let filename = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            path,
            filename,
            raw_content: raw_content.into(),
            read_error: None,
        }
    }

    /// A migration whose content could not be read. It is still validated,
    /// where it fails once.
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self {
            read_error: Some(reason.into()),
            ..Self::new(path, String::new())
        }
    }

    /// Read a migration from disk.
    ///
    /// Content that is not valid UTF-8 (Latin-1 or UTF-16 scripts) is decoded
    /// lossily. An I/O failure yields an [`unreadable`](Self::unreadable) file.
    pub fn load(path: &Path) -> Self {
        match std::fs::read(path) {
            Ok(bytes) => {
                let content = match String::from_utf8(bytes) {
                    Ok(content) => content,
                    Err(e) => {
                        log::debug!("{} is not valid UTF-8, decoding lossily", path.display());
                        String::from_utf8_lossy(e.as_bytes()).into_owned()
                    }
                };
                Self::new(path, content)
            }
            Err(e) => {
                log::debug!("Failed to read {}: {}", path.display(), e);
                Self::unreadable(path, e.to_string())
            }
        }
    }

    pub fn is_readable(&self) -> bool {
        self.read_error.is_none()
    }
}

/// Whether a filename names a repeatable migration (`R__*.sql`).
pub fn is_repeatable(filename: &str) -> bool {
    filename.starts_with(REPEATABLE_PREFIX)
}

/// Discover versioned migrations in `dir`, sorted by filename.
///
/// Every `.sql` file directly inside `dir` is a candidate, including files
/// that break the naming convention so they can be reported. Repeatable
/// migrations are skipped. A file that cannot be read is still returned, so
/// one bad file never stops the others from being validated.
pub fn discover_migrations(dir: &Path) -> CoreResult<Vec<MigrationFile>> {
    if !dir.is_dir() {
        return Err(CoreError::MigrationsDirNotFound {
            path: dir.display().to_string(),
        });
    }

    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() || path.extension().is_none_or(|e| e != "sql") {
            continue;
        }
        let Some(name) = path.file_name().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        if is_repeatable(&name) {
            log::debug!("Skipping repeatable migration {name}");
            continue;
        }
        paths.push((name, path));
    }

    paths.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(paths
        .into_iter()
        .map(|(_, path)| MigrationFile::load(&path))
        .collect())
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
