//! File-backed state store: one JSON file per key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::StateStore;
use crate::config::{CACHE_KEY_PREFIX, LAST_DATA_KEY, LAST_ERROR_KEY, LAST_IP_KEY};
use crate::error_handling::StorageError;

/// Stores each key as `<dir>/<key>.json`.
///
/// The directory is created on first write. Files that exist but do not parse
/// are logged and treated as absent. [`StateStore::clear`] only deletes the
/// files this crate writes (cache entries and last-result slots), so the
/// directory may be shared with other files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    /// Directory holding the state files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

/// Whether `path` is a cache entry or a last-result slot.
fn is_managed_file(path: &Path) -> bool {
    if !path.extension().is_some_and(|ext| ext == "json") {
        return false;
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| {
            stem.starts_with(CACHE_KEY_PREFIX)
                || [LAST_IP_KEY, LAST_DATA_KEY, LAST_ERROR_KEY].contains(&stem)
        })
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl StateStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!(
                    "Ignoring corrupt state file {}: {}",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        let content =
            serde_json::to_string_pretty(value).map_err(|source| StorageError::Serialization {
                key: key.to_string(),
                source,
            })?;
        std::fs::write(self.path_for(key), content).map_err(|e| io_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn clear(&self) -> Result<(), StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error("*", e)),
        };

        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(|e| io_error("*", e))?.path();
            if is_managed_file(&path) {
                match std::fs::remove_file(&path) {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(io_error(&path.display().to_string(), e)),
                }
            }
        }
        log::debug!("Removed {} state file(s) from {}", removed, self.dir.display());
        Ok(())
    }
}
