//! Cart totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::line_item::LineItem;
use super::price::{CurrencyCode, Price, round_money};

/// Distinct line count and rounded total of a cart.
///
/// Always computed from the items on demand; never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Number of distinct line items (not the sum of quantities).
    pub items: usize,
    /// Sum of price × quantity, rounded to cents.
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    /// Total formatted for display, e.g. `$60.00`.
    pub formatted_total: String,
}

impl CartSummary {
    /// Summarize `items`, formatting the total in `currency`.
    #[must_use]
    pub fn from_items(items: &[LineItem], currency: CurrencyCode) -> Self {
        let total = round_money(subtotal(items));
        Self {
            items: items.len(),
            total,
            formatted_total: Price::new(total, currency).display(),
        }
    }
}

/// Unrounded sum of every line total, saturating at `Decimal::MAX`.
#[must_use]
pub fn subtotal(items: &[LineItem]) -> Decimal {
    items
        .iter()
        .map(LineItem::line_total)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// Sum of all quantities across line items.
#[must_use]
pub fn total_quantity(items: &[LineItem]) -> u64 {
    items.iter().map(|item| u64::from(item.quantity.get())).sum()
}
