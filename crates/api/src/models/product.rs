//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use juniper_core::ProductId;

/// A catalog product.
///
/// `Deserialize` exists so cached featured snapshots can round-trip through
/// Redis as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price in major units (dollars).
    pub price: Decimal,
    /// Public URL of the stored product image, if any.
    pub image_url: Option<String>,
    /// Category slug used for browsing.
    pub category: String,
    /// Whether the product appears in the featured set.
    pub is_featured: bool,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}
