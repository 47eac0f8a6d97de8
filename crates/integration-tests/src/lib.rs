//! Integration tests for the storefront cart.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p storefront-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Merge, clamping, removal and summaries end to end
//! - `cross_session_sync` - Several stores sharing one durable slot
//! - `persistence` - Degraded storage, malformed slots and export/import
//!
//! This crate only hosts shared fixtures; the tests live under `tests/`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cell::RefCell;
use std::rc::Rc;

use rust_decimal::Decimal;
use storefront_cart::{CartStore, Storage};
use storefront_core::{LineItem, ProductInput};

/// Snapshots received by a recording listener, oldest first.
pub type Recorded = Rc<RefCell<Vec<Vec<LineItem>>>>;

/// The red medium shirt used throughout the scenarios: $20.00.
#[must_use]
pub fn shirt() -> ProductInput {
    ProductInput::new("sku1", "Shirt", Decimal::from(20), "shirt.jpg")
        .with_size("M")
        .with_color("red")
}

/// A product with no size or color: $12.50.
#[must_use]
pub fn mug() -> ProductInput {
    ProductInput::new("mug", "Mug", Decimal::new(1250, 2), "mug.jpg")
}

/// Subscribe a listener that keeps a copy of every snapshot it sees.
pub fn record<S: Storage>(cart: &mut CartStore<S>) -> Recorded {
    let recorded: Recorded = Rc::default();
    let sink = Rc::clone(&recorded);
    cart.add_listener(move |items| {
        sink.borrow_mut().push(items.to_vec());
        Ok(())
    });
    recorded
}
