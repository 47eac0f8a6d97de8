//! Durable key-value slots the cart persists into.
//!
//! A [`Storage`] is one view of a per-origin key-value namespace, the same
//! shape as browser local storage. Several views may share a namespace; a
//! write through one view is reported to the others as a [`StorageEvent`].

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The medium cannot be used at all (disabled, quota zero, read-only).
    #[error("storage is unavailable: {0}")]
    Unavailable(String),

    /// The key cannot be represented by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Filesystem operation failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A shared namespace lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Notification that a key changed through some other view of the namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// The value after the change, `None` if the key was removed.
    pub new_value: Option<String>,
}

/// A per-origin persistent key-value store.
pub trait Storage {
    /// Probe whether the medium accepts writes.
    fn is_available(&self) -> bool;

    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the write fails.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key` if present.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the delete fails.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Drain changes made through other views since the last poll.
    fn poll_events(&self) -> Vec<StorageEvent> {
        Vec::new()
    }
}

/// A medium that refuses every operation.
///
/// Stands in for storage that is switched off, e.g. a private browsing
/// session or a read-only data directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStorage;

impl Storage for UnavailableStorage {
    fn is_available(&self) -> bool {
        false
    }

    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn poll_events(&self) -> Vec<StorageEvent> {
        (**self).poll_events()
    }
}
