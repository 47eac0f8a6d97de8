//! Cart operation errors.
//!
//! Every failing cart operation returns a [`CartError`]; storage failures are
//! logged by the store and never surface here.

use storefront_core::ProductError;
use thiserror::Error;

/// Errors returned by [`crate::CartStore`] operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product handed to `add_item` failed validation.
    #[error("Invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// A line item index was outside the cart.
    #[error("Line item {index} out of range (cart has {len} items)")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Cart length at the time of the call.
        len: usize,
    },

    /// Imported data was not a sequence of line items.
    #[error("Invalid import: {0}")]
    InvalidImport(String),
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;
