//! Order repository for database operations.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use juniper_core::{ProductId, UserId};

use super::RepositoryError;
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, user_id, total, checkout_session_id, created_at";

/// One line of a new order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Orders and revenue aggregated over one calendar day.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DailySales {
    pub date: NaiveDate,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Materialize an order for a paid checkout session.
    ///
    /// Idempotent on the session ID: if an order for this session already
    /// exists, the existing row is returned and no new lines are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_for_session(
        &self,
        user_id: UserId,
        session_id: &str,
        total: Decimal,
        items: &[NewOrderItem],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO \"order\" (user_id, total, checkout_session_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (checkout_session_id) DO NOTHING
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(total)
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(order) = inserted else {
            // Someone already recorded this session; hand back their order.
            tx.rollback().await?;
            return self
                .get_by_session(session_id)
                .await?
                .ok_or(RepositoryError::NotFound);
        };

        for item in items {
            sqlx::query(
                "INSERT INTO order_item (order_id, product_id, quantity, unit_price)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Find an order by its checkout-session reference.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM \"order\" WHERE checkout_session_id = $1"
        ))
        .bind(session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// Lifetime order count and revenue.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn totals(&self) -> Result<(i64, Decimal), RepositoryError> {
        let row = sqlx::query_as::<_, (i64, Decimal)>(
            "SELECT COUNT(*), COALESCE(SUM(total), 0) FROM \"order\"",
        )
        .fetch_one(self.pool)
        .await?;

        Ok(row)
    }

    /// Orders and revenue per day over the trailing `days` days.
    ///
    /// Days with no orders are absent from the result.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_sales(&self, days: i32) -> Result<Vec<DailySales>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailySales>(
            "SELECT created_at::date AS date,
                    COUNT(*) AS orders,
                    COALESCE(SUM(total), 0) AS revenue
             FROM \"order\"
             WHERE created_at >= now() - make_interval(days => $1)
             GROUP BY created_at::date
             ORDER BY date",
        )
        .bind(days)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}
