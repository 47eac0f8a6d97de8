//! Cart line items and the product input they are built from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::quantity::Quantity;

/// Errors that can occur when validating a [`ProductInput`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product id is missing or blank.
    #[error("product id is required")]
    MissingId,
    /// The product title is missing or empty.
    #[error("product title is required")]
    MissingTitle,
    /// No price was supplied.
    #[error("product price is required")]
    MissingPrice,
    /// The price is zero or negative.
    #[error("product price must be greater than zero, got {0}")]
    NonPositivePrice(Decimal),
    /// The product image is missing or empty.
    #[error("product image is required")]
    MissingImage,
}

/// A product as handed to the cart by a product page.
///
/// Every field is optional at the serialization boundary so that incomplete
/// payloads surface as [`ProductError`]s rather than parse failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub id: Option<ProductId>,
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    /// Requested quantity, defaults to one.
    pub quantity: Option<i64>,
}

impl ProductInput {
    /// Create an input with the four required fields set.
    #[must_use]
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        price: Decimal,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            price: Some(price),
            image: Some(image.into()),
            ..Self::default()
        }
    }

    /// Set the selected size.
    #[must_use]
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Set the selected color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the requested quantity (clamped when the line item is built).
    #[must_use]
    pub const fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// Validate the input and build a line item stamped with `added_at`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProductError`] found, checked in the order
    /// id, title, price, image.
    pub fn into_line_item(self, added_at: DateTime<Utc>) -> Result<LineItem, ProductError> {
        let id = self
            .id
            .filter(|id| !id.is_blank())
            .ok_or(ProductError::MissingId)?;
        let title = self
            .title
            .filter(|t| !t.is_empty())
            .ok_or(ProductError::MissingTitle)?;
        let price = self.price.ok_or(ProductError::MissingPrice)?;
        if price <= Decimal::ZERO {
            return Err(ProductError::NonPositivePrice(price));
        }
        let image = self
            .image
            .filter(|i| !i.is_empty())
            .ok_or(ProductError::MissingImage)?;

        Ok(LineItem {
            id,
            title,
            price,
            image,
            size: self.size.unwrap_or_default(),
            color: self.color.unwrap_or_default(),
            quantity: Quantity::clamped(self.quantity.unwrap_or(1)),
            added_at,
        })
    }
}

/// One entry in the cart: a product, its selected variant and a quantity.
///
/// Serialized field names match the persisted cart slot exactly:
/// `id, title, price, image, size, color, quantity, addedAt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    /// Unit price, stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub image: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub quantity: Quantity,
    /// Stamped with the load time when absent from stored data.
    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Returns `true` if this item satisfies the persisted-cart invariants.
    ///
    /// Quantity is always at least one by construction, so only the
    /// identifying fields and the price need checking.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.is_blank()
            && !self.title.is_empty()
            && !self.image.is_empty()
            && self.price > Decimal::ZERO
    }

    /// Returns `true` if `other` is the same product variant.
    #[must_use]
    pub fn same_variant(&self, other: &Self) -> bool {
        self.matches(&other.id, &other.size, &other.color)
    }

    /// Returns `true` if this item has the given (id, size, color) key.
    #[must_use]
    pub fn matches(&self, id: &ProductId, size: &str, color: &str) -> bool {
        self.id == *id && self.size == size && self.color == color
    }

    /// Price multiplied by quantity, unrounded.
    ///
    /// Saturates at `Decimal::MAX` instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity.get()))
    }
}
