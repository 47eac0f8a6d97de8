//! Core types for the storefront cart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod line_item;
pub mod price;
pub mod quantity;
pub mod summary;

pub use id::*;
pub use line_item::{LineItem, ProductError, ProductInput};
pub use price::{CurrencyCode, MONEY_SCALE, Price, UnknownCurrency, round_money};
pub use quantity::{InvalidQuantity, Quantity};
pub use summary::{CartSummary, subtotal, total_quantity};
