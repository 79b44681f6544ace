//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use juniper_core::{OrderId, ProductId, UserId};

/// A materialized paid checkout.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Purchasing user.
    pub user_id: UserId,
    /// Paid total in major units, after any discount.
    pub total: Decimal,
    /// The provider's checkout-session reference; unique, which makes
    /// order materialization idempotent per session.
    pub checkout_session_id: String,
    /// When the order was recorded.
    pub created_at: DateTime<Utc>,
}

/// One line of an order, with the price at time of purchase.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Owning order.
    pub order_id: OrderId,
    /// Purchased product; `None` once the product has been removed from
    /// the catalog. The line's own quantity and price stand regardless.
    pub product_id: Option<ProductId>,
    /// Units purchased.
    pub quantity: i32,
    /// Unit price at purchase time, in major units.
    pub unit_price: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_line_survives_product_deletion() {
        let line = OrderItem {
            order_id: OrderId::new(7),
            product_id: None,
            quantity: 2,
            unit_price: Decimal::new(4999, 2),
        };

        let json = serde_json::to_value(&line).unwrap();
        assert!(json.get("product_id").unwrap().is_null());
        assert_eq!(json.get("quantity").unwrap(), 2);
        assert_eq!(json.get("unit_price").unwrap().as_str(), Some("49.99"));
    }
}
