//! In-process shared storage.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{Storage, StorageError, StorageEvent};

#[derive(Default)]
struct Origin {
    entries: HashMap<String, String>,
    next_handle: u64,
    watchers: Vec<(u64, Sender<StorageEvent>)>,
}

impl Origin {
    fn register(&mut self) -> (u64, Receiver<StorageEvent>) {
        let (tx, rx) = mpsc::channel();
        let handle = self.next_handle;
        self.next_handle += 1;
        self.watchers.push((handle, tx));
        (handle, rx)
    }

    /// Send `event` to every handle except `origin`, dropping closed ones.
    fn broadcast(&mut self, origin: u64, event: &StorageEvent) {
        self.watchers
            .retain(|(handle, tx)| *handle == origin || tx.send(event.clone()).is_ok());
    }
}

/// Key-value storage shared by every handle opened from the same origin.
///
/// Mirrors browser local storage across tabs: each [`MemoryStorage::handle`]
/// sees the same entries, and a write through one handle queues a
/// [`StorageEvent`] on all the others (never on the writer itself).
///
/// ```
/// use storefront_cart::storage::{MemoryStorage, Storage};
///
/// let tab_a = MemoryStorage::new();
/// let tab_b = tab_a.handle();
///
/// tab_a.set("cart", "[]").unwrap();
/// assert_eq!(tab_b.get("cart").unwrap().as_deref(), Some("[]"));
/// assert_eq!(tab_b.poll_events().len(), 1);
/// assert!(tab_a.poll_events().is_empty());
/// ```
pub struct MemoryStorage {
    origin: Arc<Mutex<Origin>>,
    handle: u64,
    events: Receiver<StorageEvent>,
}

impl MemoryStorage {
    /// Create a fresh, empty origin and return its first handle.
    #[must_use]
    pub fn new() -> Self {
        let mut origin = Origin::default();
        let (handle, events) = origin.register();
        Self {
            origin: Arc::new(Mutex::new(origin)),
            handle,
            events,
        }
    }

    /// Open another handle onto the same origin.
    ///
    /// A poisoned origin lock is recovered rather than propagated.
    #[must_use]
    pub fn handle(&self) -> Self {
        let mut origin = self
            .origin
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let (handle, events) = origin.register();
        drop(origin);
        Self {
            origin: Arc::clone(&self.origin),
            handle,
            events,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Origin>, StorageError> {
        self.origin.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl Storage for MemoryStorage {
    fn is_available(&self) -> bool {
        self.lock().is_ok()
    }

    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut origin = self.lock()?;
        origin.entries.insert(key.to_owned(), value.to_owned());
        let event = StorageEvent {
            key: key.to_owned(),
            new_value: Some(value.to_owned()),
        };
        origin.broadcast(self.handle, &event);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut origin = self.lock()?;
        if origin.entries.remove(key).is_some() {
            let event = StorageEvent {
                key: key.to_owned(),
                new_value: None,
            };
            origin.broadcast(self.handle, &event);
        }
        Ok(())
    }

    fn poll_events(&self) -> Vec<StorageEvent> {
        self.events.try_iter().collect()
    }
}
