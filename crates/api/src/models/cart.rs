//! Cart domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use juniper_core::ProductId;

/// One cart line joined with its product details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    /// The product in the cart.
    pub product_id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price in major units.
    pub price: Decimal,
    /// Public image URL, if any.
    pub image_url: Option<String>,
    /// Category slug.
    pub category: String,
    /// Units of this product in the cart.
    pub quantity: i32,
}
