//! Terminal rendering of carts and summaries.
//!
//! Command output goes to stdout; logs go to stderr.

#![allow(clippy::print_stdout)]

use std::fmt::Write as _;

use serde::Serialize;
use storefront_cart::OrderSummary;
use storefront_core::{CartSummary, CurrencyCode, LineItem, Price};

/// Print `value` as pretty JSON.
///
/// # Errors
///
/// Returns an error if `value` cannot be serialized.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print one row per line item followed by the cart total.
pub fn print_items(items: &[LineItem], currency: CurrencyCode) {
    print!("{}", render_items(items, currency));
}

/// Print the checkout summary.
pub fn print_order_summary(summary: &OrderSummary) {
    print!("{}", render_order_summary(summary));
}

/// Print the one-line cart badge.
pub fn print_badge(summary: &CartSummary) {
    println!("{}", render_badge(summary));
}

fn render_items(items: &[LineItem], currency: CurrencyCode) -> String {
    if items.is_empty() {
        return "Cart is empty\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<12} {:<24} {:<6} {:<8} {:>4} {:>10}",
        "#", "ID", "TITLE", "SIZE", "COLOR", "QTY", "TOTAL"
    );
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<12} {:<24} {:<6} {:<8} {:>4} {:>10}",
            index,
            item.id.as_str(),
            item.title,
            item.size,
            item.color,
            item.quantity.get(),
            Price::new(item.line_total(), currency).display()
        );
    }
    let _ = writeln!(out, "{}", render_badge(&CartSummary::from_items(items, currency)));
    out
}

fn render_order_summary(summary: &OrderSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Items:     {}", summary.item_count);
    let _ = writeln!(out, "Subtotal:  {}", summary.format(summary.subtotal));
    let _ = writeln!(out, "Shipping:  {}", summary.shipping_label());
    let _ = writeln!(out, "Tax:       {}", summary.format(summary.tax));
    let _ = writeln!(out, "Total:     {}", summary.format(summary.total));
    out
}

fn render_badge(summary: &CartSummary) -> String {
    let noun = if summary.items == 1 { "item" } else { "items" };
    format!("{} {noun}, total {}", summary.items, summary.formatted_total)
}
