//! Coupon repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use juniper_core::{CouponId, UserId};

use super::RepositoryError;
use crate::models::Coupon;

const COUPON_COLUMNS: &str = "id, user_id, code, discount_percentage, expires_at, is_active";

/// Repository for coupon database operations.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    /// Create a new coupon repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The user's coupon row, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(&self, user_id: UserId) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupon WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Look up an active coupon by code for a specific user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_active(
        &self,
        user_id: UserId,
        code: &str,
    ) -> Result<Option<Coupon>, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupon
             WHERE user_id = $1 AND code = $2 AND is_active"
        ))
        .bind(user_id)
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(coupon)
    }

    /// Deactivate a coupon by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate(&self, id: CouponId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE coupon SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Deactivate a user's coupon by code (used on redemption).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn deactivate_code(&self, user_id: UserId, code: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE coupon SET is_active = FALSE WHERE user_id = $1 AND code = $2")
            .bind(user_id)
            .bind(code)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Write the user's gift coupon, replacing any previous row.
    ///
    /// The upsert keys on `user_id`, so two concurrent mints settle on a
    /// single winning row instead of racing to insert duplicates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_gift(
        &self,
        user_id: UserId,
        code: &str,
        discount_percentage: i32,
        expires_at: DateTime<Utc>,
    ) -> Result<Coupon, RepositoryError> {
        let coupon = sqlx::query_as::<_, Coupon>(&format!(
            "INSERT INTO coupon (user_id, code, discount_percentage, expires_at, is_active)
             VALUES ($1, $2, $3, $4, TRUE)
             ON CONFLICT (user_id) DO UPDATE
             SET code = EXCLUDED.code,
                 discount_percentage = EXCLUDED.discount_percentage,
                 expires_at = EXCLUDED.expires_at,
                 is_active = TRUE
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(user_id)
        .bind(code)
        .bind(discount_percentage)
        .bind(expires_at)
        .fetch_one(self.pool)
        .await?;

        Ok(coupon)
    }
}
