//! The cart store: authoritative line items, a durable slot and listeners.

use chrono::Utc;
use serde_json::Value;
use storefront_core::{CartSummary, LineItem, ProductId, ProductInput, Quantity, total_quantity};
use tracing::instrument;

use crate::config::CartConfig;
use crate::error::{CartError, Result};
use crate::export::CartExport;
use crate::listeners::{ListenerError, ListenerId, ListenerRegistry};
use crate::pricing::{OrderSummary, PricingConfig};
use crate::storage::Storage;

/// Whether the store writes through to its durable slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Every mutation is written to storage.
    Durable,
    /// Storage was unavailable at startup; the cart lives in memory only.
    MemoryOnly,
}

/// The shopping cart for one session.
///
/// Construct exactly one store per session and hand it to whatever binds
/// user actions to cart operations; there is no global instance. Every
/// successful mutation writes the full cart to the durable slot and then
/// notifies listeners. Storage write failures are logged and the in-memory
/// cart is kept as is.
///
/// ```
/// use rust_decimal::Decimal;
/// use storefront_cart::CartStore;
/// use storefront_cart::storage::MemoryStorage;
/// use storefront_core::ProductInput;
///
/// let mut cart = CartStore::new(MemoryStorage::new());
/// cart.add_item(
///     ProductInput::new("sku1", "Shirt", Decimal::from(20), "x.jpg")
///         .with_size("M")
///         .with_color("red"),
/// )
/// .unwrap();
///
/// assert_eq!(cart.item_count(), 1);
/// assert_eq!(cart.summary().formatted_total, "$20.00");
/// ```
pub struct CartStore<S: Storage> {
    storage: S,
    key: String,
    items: Vec<LineItem>,
    listeners: ListenerRegistry,
    persistence: Persistence,
    pricing: PricingConfig,
}

impl<S: Storage> CartStore<S> {
    /// Open the cart with default configuration.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::with_config(storage, &CartConfig::default())
    }

    /// Open the cart stored under `config.storage_key`.
    ///
    /// Never fails: unavailable storage degrades to a memory-only cart
    /// (logged once, here), and unreadable or malformed content loads as an
    /// empty cart.
    #[must_use]
    pub fn with_config(storage: S, config: &CartConfig) -> Self {
        let persistence = if storage.is_available() {
            Persistence::Durable
        } else {
            tracing::warn!(
                key = %config.storage_key,
                "storage is not available, cart will be kept in memory only"
            );
            Persistence::MemoryOnly
        };

        let mut store = Self {
            storage,
            key: config.storage_key.clone(),
            items: Vec::new(),
            listeners: ListenerRegistry::new(),
            persistence,
            pricing: config.pricing,
        };
        store.load_from_slot();
        store
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a product to the cart.
    ///
    /// A product whose (id, size, color) matches an existing line increases
    /// that line's quantity; anything else is appended.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidProduct`] if the id, title, price or image
    /// is missing, or the price is not positive. The cart is untouched.
    #[instrument(skip(self, product), fields(id = ?product.id))]
    pub fn add_item(&mut self, product: ProductInput) -> Result<()> {
        let item = product.into_line_item(Utc::now()).map_err(|e| {
            tracing::warn!(error = %e, "rejected invalid product");
            CartError::from(e)
        })?;

        if let Some(existing) = self.items.iter_mut().find(|line| line.same_variant(&item)) {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
            tracing::debug!(quantity = %existing.quantity, "merged into existing line");
        } else {
            tracing::debug!(quantity = %item.quantity, "appended new line");
            self.items.push(item);
        }

        self.commit();
        Ok(())
    }

    /// Remove and return the line at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] and leaves the cart unchanged
    /// if there is no such line.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, index: usize) -> Result<LineItem> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        self.commit();
        Ok(removed)
    }

    /// Set the quantity of the line at `index`, clamping to at least one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, index: usize, new_quantity: i64) -> Result<()> {
        self.set_quantity(index, Quantity::clamped(new_quantity))
    }

    /// Set the quantity from raw user input; non-numeric input becomes one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    #[instrument(skip(self))]
    pub fn update_quantity_str(&mut self, index: usize, raw: &str) -> Result<()> {
        self.set_quantity(index, Quantity::parse_lenient(raw))
    }

    /// Change the quantity of the line at `index` by `delta`, never below one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::IndexOutOfRange`] if there is no such line.
    #[instrument(skip(self))]
    pub fn adjust_quantity(&mut self, index: usize, delta: i64) -> Result<Quantity> {
        let current = self.line(index).map(|line| line.quantity);
        let Some(current) = current else {
            return Err(self.out_of_range(index));
        };
        let next = current.offset(delta);
        self.set_quantity(index, next)?;
        Ok(next)
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.items.clear();
        self.commit();
    }

    /// Drop every line that violates the cart invariants.
    ///
    /// Returns how many lines were removed. Storage and listeners are only
    /// touched when something was removed.
    pub fn validate(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(LineItem::is_valid);
        let removed = before - self.items.len();
        if removed > 0 {
            tracing::warn!(removed, "invalid cart items removed");
            self.commit();
        }
        removed
    }

    /// Replace the cart with a JSON array of line items.
    ///
    /// Entries that do not decode or fail validation are dropped. Returns the
    /// number of lines kept.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidImport`] if `data` is not an array; the
    /// cart is untouched.
    #[instrument(skip_all)]
    pub fn import(&mut self, data: Value) -> Result<usize> {
        let (items, dropped) = decode_items(data).ok_or_else(|| {
            CartError::InvalidImport("expected an array of line items".to_string())
        })?;
        if dropped > 0 {
            tracing::warn!(dropped, "invalid cart items removed during import");
        }
        self.items = items;
        self.commit();
        Ok(self.items.len())
    }

    /// Replace the cart with already-typed line items.
    ///
    /// Invalid lines are dropped. Returns the number of lines kept.
    #[instrument(skip_all, fields(count = items.len()))]
    pub fn import_items(&mut self, mut items: Vec<LineItem>) -> usize {
        let before = items.len();
        items.retain(LineItem::is_valid);
        if items.len() < before {
            tracing::warn!(
                dropped = before - items.len(),
                "invalid cart items removed during import"
            );
        }
        self.items = items;
        self.commit();
        self.items.len()
    }

    /// Re-read the durable slot and notify listeners.
    ///
    /// A memory-only store has nothing to re-read and only notifies.
    pub fn reload(&mut self) {
        self.load_from_slot();
        self.listeners.notify(&self.items);
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Copy of the current line items.
    #[must_use]
    pub fn cart(&self) -> Vec<LineItem> {
        self.items.clone()
    }

    /// Read-only view of the current line items.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// The line at `index`, if any.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&LineItem> {
        self.items.get(index)
    }

    /// Position of the line with the given (id, size, color).
    #[must_use]
    pub fn find(&self, id: &ProductId, size: &str, color: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|line| line.matches(id, size, color))
    }

    /// Distinct line count and rounded total.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from_items(&self.items, self.pricing.currency)
    }

    /// Subtotal, shipping, tax and grand total for checkout.
    #[must_use]
    pub fn order_summary(&self) -> OrderSummary {
        OrderSummary::for_items(&self.items, &self.pricing)
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        total_quantity(&self.items)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items plus a summary snapshot, stamped now.
    #[must_use]
    pub fn export(&self) -> CartExport {
        CartExport {
            items: self.cart(),
            summary: self.summary(),
            exported_at: Utc::now(),
        }
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Subscribe to cart changes.
    ///
    /// The listener runs after every successful mutation and after a reload
    /// triggered by another session. Errors and panics inside it are logged
    /// and do not affect the cart or other listeners.
    pub fn add_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&[LineItem]) -> std::result::Result<(), ListenerError> + 'static,
    {
        self.listeners.add(listener)
    }

    /// Unsubscribe a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // =========================================================================
    // Storage
    // =========================================================================

    /// Key of the durable slot.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Whether mutations are written through to storage.
    #[must_use]
    pub const fn persistence(&self) -> Persistence {
        self.persistence
    }

    /// Returns `true` unless the store degraded to memory-only.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistence == Persistence::Durable
    }

    /// The backing storage.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn set_quantity(&mut self, index: usize, quantity: Quantity) -> Result<()> {
        let len = self.items.len();
        let line = self
            .items
            .get_mut(index)
            .ok_or(CartError::IndexOutOfRange { index, len })?;
        line.quantity = quantity;
        self.commit();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(self.out_of_range(index))
        }
    }

    fn out_of_range(&self, index: usize) -> CartError {
        tracing::debug!(index, len = self.items.len(), "line index out of range");
        CartError::IndexOutOfRange {
            index,
            len: self.items.len(),
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.listeners.notify(&self.items);
    }

    fn persist(&self) {
        if self.persistence == Persistence::MemoryOnly {
            return;
        }
        let payload = match serde_json::to_string(&self.items) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to serialize cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &payload) {
            tracing::error!(key = %self.key, error = %e, "failed to persist cart");
        }
    }

    fn load_from_slot(&mut self) {
        if self.persistence == Persistence::MemoryOnly {
            return;
        }
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.items.clear();
                return;
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to read cart, starting empty");
                self.items.clear();
                return;
            }
        };

        let decoded = serde_json::from_str::<Value>(&raw)
            .ok()
            .and_then(decode_items);
        if let Some((items, dropped)) = decoded {
            self.items = items;
            if dropped > 0 {
                tracing::warn!(dropped, "invalid cart items removed");
                self.persist();
            }
        } else {
            tracing::warn!(key = %self.key, "stored cart is malformed, starting empty");
            self.items.clear();
        }
    }
}

impl<S: Storage> std::fmt::Debug for CartStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.items)
            .field("persistence", &self.persistence)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

/// Decode a JSON array of line items, keeping the valid ones.
///
/// Returns `None` if `value` is not an array, otherwise the kept items and
/// how many entries were dropped.
fn decode_items(value: Value) -> Option<(Vec<LineItem>, usize)> {
    let Value::Array(entries) = value else {
        return None;
    };
    let total = entries.len();
    let items: Vec<LineItem> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<LineItem>(entry).ok())
        .filter(LineItem::is_valid)
        .collect();
    let dropped = total - items.len();
    Some((items, dropped))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::storage::{MemoryStorage, StorageError, UnavailableStorage};

    /// Reads as empty and refuses every write, like a full disk.
    struct RejectingWrites;

    impl Storage for RejectingWrites {
        fn is_available(&self) -> bool {
            true
        }

        fn get(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&self, _key: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("quota exceeded".to_string()))
        }
    }

    fn shirt() -> ProductInput {
        ProductInput::new("sku1", "Shirt", Decimal::from(20), "x.jpg")
            .with_size("M")
            .with_color("red")
    }

    fn stored_items(storage: &MemoryStorage) -> Value {
        let raw = storage.get("ecommerce-cart").unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_starts_empty() {
        let cart = CartStore::new(MemoryStorage::new());
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
        assert!(cart.is_persistent());
    }

    #[test]
    fn test_shirt_scenario() {
        let mut cart = CartStore::new(MemoryStorage::new());

        cart.add_item(shirt().with_quantity(1)).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.summary().total, Decimal::from(20));

        cart.add_item(shirt().with_quantity(2)).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.summary().total, Decimal::from(60));
        assert_eq!(cart.summary().formatted_total, "$60.00");

        cart.update_quantity(0, -1).unwrap();
        assert_eq!(cart.line(0).unwrap().quantity, Quantity::ONE);
        assert_eq!(cart.summary().total, Decimal::from(20));

        cart.remove_item(0).unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_distinct_variants_get_separate_lines() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        cart.add_item(shirt().with_size("L")).unwrap();
        cart.add_item(shirt().with_color("blue")).unwrap();
        cart.add_item(ProductInput::new("sku2", "Shirt", Decimal::from(20), "x.jpg"))
            .unwrap();
        assert_eq!(cart.len(), 4);
        assert_eq!(cart.summary().items, 4);
    }

    #[test]
    fn test_missing_variant_merges_with_empty_variant() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let plain = ProductInput::new("sku1", "Shirt", Decimal::from(20), "x.jpg");
        cart.add_item(plain.clone()).unwrap();
        cart.add_item(plain.with_size("").with_color("")).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_merge_keeps_first_line_data() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        let first_added = cart.line(0).unwrap().added_at;
        let mut renamed = shirt();
        renamed.title = Some("Renamed".to_string());
        cart.add_item(renamed).unwrap();
        let line = cart.line(0).unwrap();
        assert_eq!(line.title, "Shirt");
        assert_eq!(line.added_at, first_added);
    }

    #[test]
    fn test_invalid_product_is_rejected_without_side_effects() {
        let storage = MemoryStorage::new();
        let peer = storage.handle();
        let mut cart = CartStore::new(storage);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        cart.add_listener(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let err = cart
            .add_item(ProductInput::new("sku1", "Shirt", Decimal::ZERO, "x.jpg"))
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidProduct(_)));
        assert!(cart.is_empty());
        assert_eq!(hits.get(), 0);
        assert!(peer.poll_events().is_empty());
    }

    #[test]
    fn test_requested_quantity_is_clamped_on_add() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt().with_quantity(0)).unwrap();
        cart.add_item(shirt().with_quantity(-4)).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_update_quantity_clamps() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt().with_quantity(5)).unwrap();

        cart.update_quantity(0, 0).unwrap();
        assert_eq!(cart.item_count(), 1);

        cart.update_quantity(0, 7).unwrap();
        assert_eq!(cart.item_count(), 7);

        cart.update_quantity(0, -5).unwrap();
        assert_eq!(cart.item_count(), 1);

        cart.update_quantity_str(0, "abc").unwrap();
        assert_eq!(cart.item_count(), 1);

        cart.update_quantity_str(0, "4").unwrap();
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_update_quantity_out_of_range() {
        let mut cart = CartStore::new(MemoryStorage::new());
        assert_eq!(
            cart.update_quantity(0, 2),
            Err(CartError::IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_adjust_quantity() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt().with_quantity(2)).unwrap();
        assert_eq!(cart.adjust_quantity(0, 1).unwrap().get(), 3);
        assert_eq!(cart.adjust_quantity(0, -10).unwrap().get(), 1);
        assert!(cart.adjust_quantity(1, 1).is_err());
    }

    #[test]
    fn test_remove_out_of_range_leaves_cart_unchanged() {
        let storage = MemoryStorage::new();
        let peer = storage.handle();
        let mut cart = CartStore::new(storage);
        cart.add_item(shirt()).unwrap();
        peer.poll_events();
        let before = cart.cart();

        assert_eq!(
            cart.remove_item(1),
            Err(CartError::IndexOutOfRange { index: 1, len: 1 })
        );
        assert_eq!(cart.cart(), before);
        assert!(peer.poll_events().is_empty());
    }

    #[test]
    fn test_remove_returns_removed_line() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        cart.add_item(shirt().with_size("L")).unwrap();
        let removed = cart.remove_item(0).unwrap();
        assert_eq!(removed.size, "M");
        let id = ProductId::new("sku1");
        assert_eq!(cart.find(&id, "M", "red"), None);
        assert_eq!(cart.find(&id, "L", "red"), Some(0));
    }

    #[test]
    fn test_cart_returns_a_copy() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        let mut copy = cart.cart();
        copy.clear();
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let observer = storage.handle();
        let mut cart = CartStore::new(storage);

        cart.add_item(shirt().with_quantity(2)).unwrap();
        assert_eq!(stored_items(&observer)[0]["quantity"], json!(2));

        cart.update_quantity(0, 5).unwrap();
        assert_eq!(stored_items(&observer)[0]["quantity"], json!(5));

        cart.clear();
        assert_eq!(stored_items(&observer), json!([]));
    }

    #[test]
    fn test_loads_persisted_cart() {
        let storage = MemoryStorage::new();
        let second_session = storage.handle();
        {
            let mut cart = CartStore::new(storage);
            cart.add_item(shirt().with_quantity(3)).unwrap();
        }
        let cart = CartStore::new(second_session);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.line(0).unwrap().title, "Shirt");
    }

    #[test]
    fn test_malformed_storage_loads_empty() {
        for raw in ["not json", "{\"items\":[]}", "42", "null"] {
            let storage = MemoryStorage::new();
            storage.set("ecommerce-cart", raw).unwrap();
            let cart = CartStore::new(storage);
            assert!(cart.is_empty(), "expected empty cart for {raw}");
        }
    }

    #[test]
    fn test_invalid_persisted_items_are_dropped_and_rewritten() {
        let storage = MemoryStorage::new();
        let observer = storage.handle();
        let stored = json!([
            {"id":"sku1","title":"Shirt","price":20,"image":"x.jpg","size":"M","color":"red",
             "quantity":1,"addedAt":"2024-05-01T10:00:00Z"},
            {"id":"sku2","title":"","price":20,"image":"x.jpg","quantity":1,
             "addedAt":"2024-05-01T10:00:00Z"},
            {"id":"sku3","title":"Free","price":0,"image":"x.jpg","quantity":1,
             "addedAt":"2024-05-01T10:00:00Z"},
            {"id":"sku4","title":"Cap","image":"c.jpg","quantity":1,
             "addedAt":"2024-05-01T10:00:00Z"},
            {"id":"sku5","title":"Sock","price":3,"image":"s.jpg","quantity":0,
             "addedAt":"2024-05-01T10:00:00Z"}
        ]);
        storage.set("ecommerce-cart", &stored.to_string()).unwrap();

        let cart = CartStore::new(storage);
        assert_eq!(cart.len(), 1);
        assert_eq!(stored_items(&observer).as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_unavailable_storage_degrades_to_memory() {
        let mut cart = CartStore::new(UnavailableStorage);
        assert_eq!(cart.persistence(), Persistence::MemoryOnly);
        cart.add_item(shirt()).unwrap();
        cart.update_quantity(0, 3).unwrap();
        assert_eq!(cart.item_count(), 3);
        cart.reload();
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_listeners_receive_the_cart() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = cart.add_listener(move |items| {
            sink.borrow_mut().push(items.len());
            Ok(())
        });

        cart.add_item(shirt()).unwrap();
        cart.add_item(shirt().with_size("L")).unwrap();
        cart.remove_item(0).unwrap();
        cart.clear();
        assert_eq!(*seen.borrow(), vec![1, 2, 1, 0]);

        assert!(cart.remove_listener(id));
        cart.add_item(shirt()).unwrap();
        assert_eq!(seen.borrow().len(), 4);
    }

    #[test]
    fn test_failing_listener_does_not_corrupt_state() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let hits = Rc::new(Cell::new(0));
        cart.add_listener(|_| panic!("render crashed"));
        cart.add_listener(|_| Err("template missing".into()));
        let counter = Rc::clone(&hits);
        cart.add_listener(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        cart.add_item(shirt()).unwrap();
        cart.update_quantity(0, 2).unwrap();

        assert_eq!(hits.get(), 2);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.listener_count(), 3);
    }

    #[test]
    fn test_validate_removes_invalid_lines() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        let mut broken = cart.line(0).unwrap().clone();
        broken.image = String::new();
        let mut items = cart.cart();
        items.push(broken);
        // import_items already validates, so inject through the raw field.
        cart.items = items;

        assert_eq!(cart.validate(), 1);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.validate(), 0);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt().with_quantity(2)).unwrap();
        cart.add_item(ProductInput::new("sku9", "Hat", Decimal::new(1250, 2), "h.jpg"))
            .unwrap();

        let exported = cart.export();
        assert_eq!(exported.summary.items, 2);
        assert_eq!(exported.summary.total, Decimal::new(5250, 2));

        let mut other = CartStore::new(MemoryStorage::new());
        let kept = other
            .import(serde_json::to_value(&exported.items).unwrap())
            .unwrap();
        assert_eq!(kept, 2);
        assert_eq!(other.cart(), cart.cart());
    }

    #[test]
    fn test_import_rejects_non_array() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt()).unwrap();
        let err = cart.import(json!({"items": []})).unwrap_err();
        assert!(matches!(err, CartError::InvalidImport(_)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_import_items_drops_invalid() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let good = shirt().into_line_item(Utc::now()).unwrap();
        let mut bad = good.clone();
        bad.price = Decimal::ZERO;
        assert_eq!(cart.import_items(vec![good, bad]), 1);
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_order_summary_uses_pricing() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(shirt().with_quantity(2)).unwrap();
        let order = cart.order_summary();
        assert_eq!(order.subtotal, Decimal::from(40));
        assert_eq!(order.total, Decimal::new(4919, 2));
    }

    #[test]
    fn test_custom_storage_key() {
        let storage = MemoryStorage::new();
        let observer = storage.handle();
        let config = CartConfig {
            storage_key: "cart".to_string(),
            ..CartConfig::default()
        };
        let mut cart = CartStore::with_config(storage, &config);
        cart.add_item(shirt()).unwrap();
        assert!(observer.get("cart").unwrap().is_some());
        assert!(observer.get("ecommerce-cart").unwrap().is_none());
        assert_eq!(cart.storage_key(), "cart");
    }

    #[test]
    fn test_write_failure_keeps_mutation_and_notifies() {
        let mut cart = CartStore::new(RejectingWrites);
        assert!(cart.is_persistent());
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        cart.add_listener(move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        cart.add_item(shirt()).unwrap();
        cart.add_item(shirt()).unwrap();
        cart.update_quantity(0, 5).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(hits.get(), 3);
    }

    #[test]
    fn test_items_without_added_at_survive_load() {
        let storage = MemoryStorage::new();
        let stored = json!([
            {"id":"sku1","title":"Shirt","price":20,"image":"x.jpg","size":"M","color":"red",
             "quantity":2}
        ]);
        storage.set("ecommerce-cart", &stored.to_string()).unwrap();
        let observer = storage.handle();

        let cart = CartStore::new(storage);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 2);
        assert_eq!(stored_items(&observer), stored);
    }

    #[test]
    fn test_import_without_added_at_keeps_items() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let kept = cart
            .import(json!([
                {"id":"sku1","title":"Shirt","price":20,"image":"x.jpg","size":"M",
                 "color":"red","quantity":1}
            ]))
            .unwrap();
        assert_eq!(kept, 1);
        assert_eq!(cart.line(0).unwrap().title, "Shirt");
    }

    #[test]
    fn test_huge_prices_do_not_panic_totals() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add_item(
            ProductInput::new("a", "A", Decimal::MAX / Decimal::TWO, "a.jpg").with_quantity(3),
        )
        .unwrap();

        assert_eq!(cart.summary().total, Decimal::MAX);
        assert_eq!(cart.order_summary().total, Decimal::MAX);
        assert_eq!(cart.export().summary.total, Decimal::MAX);
    }
}
