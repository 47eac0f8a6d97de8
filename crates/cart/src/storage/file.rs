//! Directory-backed storage, one file per key.

use std::collections::HashMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tempfile::NamedTempFile;

use super::{Storage, StorageError, StorageEvent};

const PROBE_FILE: &str = ".storage-probe";

/// Key-value storage persisted as `<dir>/<key>.json` files.
///
/// Several processes may point at the same directory. Each `FileStorage`
/// remembers the last value it read or wrote per key, so
/// [`Storage::poll_events`] reports exactly the changes made by someone else.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    seen: Mutex<HashMap<String, Option<String>>>,
}

impl FileStorage {
    /// Open storage rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Directory holding the key files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn read_path(path: &Path) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remember(&self, key: &str, value: Option<String>) {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value);
    }
}

/// Write `bytes` to `path` through a temp file and rename.
///
/// The temp file lives next to `path` and is deleted if any step fails.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::InvalidKey(path.display().to_string()))?;
    std::fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

impl Storage for FileStorage {
    fn is_available(&self) -> bool {
        let probe = self.dir.join(PROBE_FILE);
        let result = std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&probe, b"probe"))
            .and_then(|()| std::fs::remove_file(&probe));
        if let Err(e) = &result {
            tracing::debug!(dir = %self.dir.display(), error = %e, "storage probe failed");
        }
        result.is_ok()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = Self::read_path(&self.path_for(key)?)?;
        self.remember(key, value.clone());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        write_atomic(&self.path_for(key)?, value.as_bytes())?;
        self.remember(key, Some(value.to_owned()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)?) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.remember(key, None);
        Ok(())
    }

    fn poll_events(&self) -> Vec<StorageEvent> {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        let mut events = Vec::new();
        for (key, last) in seen.iter_mut() {
            let Ok(path) = self.path_for(key) else {
                continue;
            };
            let current = match Self::read_path(&path) {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to poll storage key");
                    continue;
                }
            };
            if current != *last {
                events.push(StorageEvent {
                    key: key.clone(),
                    new_value: current.clone(),
                });
                *last = current;
            }
        }
        events
    }
}
