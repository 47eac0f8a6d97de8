//! Checkout pricing: shipping and tax on top of the cart subtotal.

use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::{CurrencyCode, LineItem, Price, round_money, subtotal, total_quantity};

/// Shipping and tax rules applied at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Decimal,
    /// Flat shipping charged below the threshold.
    pub flat_shipping: Decimal,
    /// Tax rate applied to the subtotal (0.08 = 8%).
    pub tax_rate: Decimal,
    /// Currency used for formatting.
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Decimal::from(50),
            flat_shipping: Decimal::new(599, 2),
            tax_rate: Decimal::new(8, 2),
            currency: CurrencyCode::USD,
        }
    }
}

/// Totals shown on the cart page before checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Sum of all quantities.
    pub item_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(skip)]
    currency: CurrencyCode,
}

impl OrderSummary {
    /// Price `items` under `config`.
    ///
    /// An empty cart owes nothing, shipping included.
    #[must_use]
    pub fn for_items(items: &[LineItem], config: &PricingConfig) -> Self {
        let subtotal = round_money(subtotal(items));
        let shipping = if items.is_empty() || subtotal > config.free_shipping_threshold {
            Decimal::ZERO
        } else {
            config.flat_shipping
        };
        let tax = round_money(subtotal.saturating_mul(config.tax_rate));
        Self {
            item_count: total_quantity(items),
            subtotal,
            shipping,
            tax,
            total: round_money(subtotal.saturating_add(shipping).saturating_add(tax)),
            currency: config.currency,
        }
    }

    /// Returns `true` if shipping is waived.
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }

    /// Shipping line as displayed: `Free` or a formatted amount.
    #[must_use]
    pub fn shipping_label(&self) -> String {
        if self.ships_free() {
            "Free".to_string()
        } else {
            self.format(self.shipping)
        }
    }

    /// Format an amount in this summary's currency.
    #[must_use]
    pub fn format(&self, amount: Decimal) -> String {
        Price::new(amount, self.currency).display()
    }
}
