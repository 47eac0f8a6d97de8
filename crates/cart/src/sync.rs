//! Convergence with other sessions sharing the durable slot.
//!
//! Another tab or process writing the slot shows up as a [`StorageEvent`].
//! The store answers by re-reading the slot and re-notifying its listeners,
//! so the last writer wins; there is no merging.

use crate::storage::{Storage, StorageEvent};
use crate::store::CartStore;

impl<S: Storage> CartStore<S> {
    /// React to a change notification for the shared namespace.
    ///
    /// Returns `true` if the event concerned this cart's slot and the cart
    /// was reloaded.
    pub fn handle_storage_event(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.storage_key() || !self.is_persistent() {
            return false;
        }
        tracing::debug!(
            key = %event.key,
            removed = event.new_value.is_none(),
            "cart changed elsewhere, reloading"
        );
        self.reload();
        true
    }

    /// Drain pending change notifications from storage and apply them.
    ///
    /// Several writes to the slot since the last call collapse into a single
    /// reload. Returns `true` if the cart was reloaded.
    pub fn sync_external_changes(&mut self) -> bool {
        let events = self.storage().poll_events();
        let latest = events
            .iter()
            .rev()
            .find(|event| event.key == self.storage_key());
        match latest {
            Some(event) => self.handle_storage_event(event),
            None => false,
        }
    }
}
