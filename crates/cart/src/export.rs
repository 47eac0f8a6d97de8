//! Portable snapshot of a cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::{CartSummary, LineItem};

/// Everything needed to move a cart between sessions.
///
/// `items` is the same JSON array the durable slot holds, so it can be fed
/// straight back into [`crate::CartStore::import`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartExport {
    pub items: Vec<LineItem>,
    pub summary: CartSummary,
    pub exported_at: DateTime<Utc>,
}
