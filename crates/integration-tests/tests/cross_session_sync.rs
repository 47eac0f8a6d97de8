//! Several sessions sharing one durable slot converge on the last write.

#![allow(clippy::unwrap_used)]

use storefront_cart::storage::{FileStorage, MemoryStorage};
use storefront_cart::{CartConfig, CartStore, Storage, StorageEvent};
use storefront_integration_tests::{mug, record, shirt};

#[test]
fn memory_sessions_converge() {
    let origin = MemoryStorage::new();
    let mut tab_a = CartStore::new(origin.handle());
    let mut tab_b = CartStore::new(origin.handle());
    let seen_by_b = record(&mut tab_b);

    tab_a.add_item(shirt()).unwrap();
    assert!(tab_b.sync_external_changes());
    assert_eq!(tab_b.items(), tab_a.items());
    assert_eq!(seen_by_b.borrow().len(), 1);

    // A session never reacts to its own writes.
    assert!(!tab_a.sync_external_changes());
}

#[test]
fn bursts_collapse_into_one_reload() {
    let origin = MemoryStorage::new();
    let mut tab_a = CartStore::new(origin.handle());
    let mut tab_b = CartStore::new(origin.handle());
    let seen_by_b = record(&mut tab_b);

    tab_a.add_item(shirt()).unwrap();
    tab_a.add_item(mug()).unwrap();
    tab_a.update_quantity(1, 4).unwrap();

    assert!(tab_b.sync_external_changes());
    assert!(!tab_b.sync_external_changes());
    assert_eq!(seen_by_b.borrow().len(), 1);
    assert_eq!(tab_b.item_count(), 5);
}

#[test]
fn last_writer_wins() {
    let origin = MemoryStorage::new();
    let mut tab_a = CartStore::new(origin.handle());
    let mut tab_b = CartStore::new(origin.handle());

    tab_a.add_item(shirt()).unwrap();
    tab_b.add_item(mug()).unwrap();

    // B wrote last without having seen A's shirt.
    tab_a.sync_external_changes();
    tab_b.sync_external_changes();
    assert_eq!(tab_a.items(), tab_b.items());
    assert_eq!(tab_a.len(), 1);
    assert_eq!(tab_a.line(0).unwrap().title, "Mug");
}

#[test]
fn foreign_clear_empties_other_sessions() {
    let origin = MemoryStorage::new();
    let mut tab_a = CartStore::new(origin.handle());
    tab_a.add_item(shirt()).unwrap();

    let mut tab_b = CartStore::new(origin.handle());
    assert_eq!(tab_b.len(), 1);

    origin.remove("ecommerce-cart").unwrap();
    assert!(tab_b.sync_external_changes());
    assert!(tab_b.is_empty());
}

#[test]
fn events_for_other_keys_are_ignored() {
    let origin = MemoryStorage::new();
    let mut cart = CartStore::new(origin.handle());
    let seen = record(&mut cart);

    origin.set("wishlist", "[]").unwrap();
    assert!(!cart.sync_external_changes());

    let handled = cart.handle_storage_event(&StorageEvent {
        key: "wishlist".to_string(),
        new_value: Some("[]".to_string()),
    });
    assert!(!handled);
    assert!(seen.borrow().is_empty());
}

#[test]
fn file_sessions_converge() {
    let dir = tempfile::tempdir().unwrap();
    let config = CartConfig {
        data_dir: dir.path().to_path_buf(),
        ..CartConfig::default()
    };
    let mut proc_a = CartStore::with_config(FileStorage::new(&config.data_dir), &config);
    let mut proc_b = CartStore::with_config(FileStorage::new(&config.data_dir), &config);
    let seen_by_b = record(&mut proc_b);

    assert!(proc_a.is_persistent());
    proc_a.add_item(shirt().with_quantity(2)).unwrap();
    assert!(dir.path().join("ecommerce-cart.json").exists());

    assert!(proc_b.sync_external_changes());
    assert_eq!(proc_b.items(), proc_a.items());
    assert_eq!(seen_by_b.borrow().len(), 1);

    proc_b.clear();
    assert!(proc_a.sync_external_changes());
    assert!(proc_a.is_empty());
    assert!(!proc_b.sync_external_changes());
}

#[test]
fn custom_storage_key_isolates_carts() {
    let origin = MemoryStorage::new();
    let guest = CartConfig {
        storage_key: "guest-cart".to_string(),
        ..CartConfig::default()
    };
    let mut default_cart = CartStore::new(origin.handle());
    let mut guest_cart = CartStore::with_config(origin.handle(), &guest);

    guest_cart.add_item(mug()).unwrap();
    assert!(!default_cart.sync_external_changes());
    assert!(default_cart.is_empty());
    assert!(origin.get("guest-cart").unwrap().is_some());
}
