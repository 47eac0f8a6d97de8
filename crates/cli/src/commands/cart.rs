//! Cart editing commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cart add --id sku1 --title Shirt --price 20 --image shirt.jpg -q 2
//! sf-cart bump 0 -1
//! sf-cart export -o cart.json
//! sf-cart import cart.json
//! ```
//!
//! # Environment Variables
//!
//! - `CART_DATA_DIR` - Directory holding the cart file
//! - `CART_STORAGE_KEY` - Name of the cart slot inside that directory

use std::path::Path;

use rust_decimal::Decimal;
use serde_json::Value;
use storefront_cart::{CartConfig, CartStore, Storage};
use storefront_core::ProductInput;

use super::CliError;
use crate::output;

/// Build the product for `add` from its command-line arguments.
pub fn product(
    id: String,
    title: String,
    price: Decimal,
    image: String,
    size: Option<String>,
    color: Option<String>,
    quantity: i64,
) -> ProductInput {
    ProductInput {
        size,
        color,
        ..ProductInput::new(id, title, price, image)
    }
    .with_quantity(quantity)
}

/// Print the line items.
///
/// # Errors
///
/// Returns an error if the items cannot be serialized.
pub fn list<S: Storage>(
    cart: &CartStore<S>,
    config: &CartConfig,
    json: bool,
) -> Result<(), CliError> {
    if json {
        output::print_json(cart.items())?;
    } else {
        output::print_items(cart.items(), config.pricing.currency);
    }
    Ok(())
}

/// Add a product, merging with a matching line.
///
/// # Errors
///
/// Returns an error if the product fails validation.
pub fn add<S: Storage>(cart: &mut CartStore<S>, product: ProductInput) -> Result<(), CliError> {
    cart.add_item(product)?;
    tracing::info!(lines = cart.len(), items = cart.item_count(), "Item added");
    Ok(())
}

/// Remove the line at `index`.
///
/// # Errors
///
/// Returns an error if `index` is out of range.
pub fn remove<S: Storage>(cart: &mut CartStore<S>, index: usize) -> Result<(), CliError> {
    let removed = cart.remove_item(index)?;
    tracing::info!(id = %removed.id, title = %removed.title, "Line removed");
    Ok(())
}

/// Set the quantity of the line at `index` from user text.
///
/// # Errors
///
/// Returns an error if `index` is out of range.
pub fn set_quantity<S: Storage>(
    cart: &mut CartStore<S>,
    index: usize,
    raw: &str,
) -> Result<(), CliError> {
    cart.update_quantity_str(index, raw)?;
    if let Some(line) = cart.line(index) {
        tracing::info!(index, quantity = %line.quantity, "Quantity updated");
    }
    Ok(())
}

/// Step the quantity of the line at `index` by `delta`.
///
/// # Errors
///
/// Returns an error if `index` is out of range.
pub fn bump<S: Storage>(cart: &mut CartStore<S>, index: usize, delta: i64) -> Result<(), CliError> {
    let quantity = cart.adjust_quantity(index, delta)?;
    tracing::info!(index, %quantity, "Quantity updated");
    Ok(())
}

/// Empty the cart.
pub fn clear<S: Storage>(cart: &mut CartStore<S>) {
    cart.clear();
    tracing::info!("Cart cleared");
}

/// Print the checkout summary.
///
/// # Errors
///
/// Returns an error if the summary cannot be serialized.
pub fn summary<S: Storage>(cart: &CartStore<S>, json: bool) -> Result<(), CliError> {
    let summary = cart.order_summary();
    if json {
        output::print_json(&summary)?;
    } else {
        output::print_order_summary(&summary);
    }
    Ok(())
}

/// Drop invalid lines.
pub fn validate<S: Storage>(cart: &mut CartStore<S>) {
    let removed = cart.validate();
    if removed == 0 {
        tracing::info!(lines = cart.len(), "Cart is valid");
    } else {
        tracing::warn!(removed, lines = cart.len(), "Invalid lines removed");
    }
}

/// Write the export snapshot to `path`, or stdout when `None`.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn export<S: Storage>(cart: &CartStore<S>, path: Option<&Path>) -> Result<(), CliError> {
    let snapshot = cart.export();
    match path {
        Some(path) => {
            std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
            tracing::info!(path = %path.display(), lines = snapshot.items.len(), "Cart exported");
        }
        None => output::print_json(&snapshot)?,
    }
    Ok(())
}

/// Replace the cart with the contents of `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not JSON, or holds
/// neither an export snapshot nor a line item array.
pub fn import<S: Storage>(cart: &mut CartStore<S>, path: &Path) -> Result<(), CliError> {
    let data: Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;
    let kept = cart.import(import_payload(data))?;
    tracing::info!(path = %path.display(), lines = kept, "Cart imported");
    Ok(())
}

/// Accept either an export snapshot or the bare items array it wraps.
fn import_payload(data: Value) -> Value {
    match data {
        Value::Object(mut snapshot) if snapshot.contains_key("items") => {
            snapshot.remove("items").unwrap_or(Value::Null)
        }
        other => other,
    }
}
