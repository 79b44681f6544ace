//! Coupon domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use juniper_core::{CouponId, UserId};

/// A per-user gift coupon.
///
/// Each user holds at most one coupon row; minting a new one replaces the
/// expired code in place.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Coupon {
    /// Unique coupon ID.
    pub id: CouponId,
    /// Owning user.
    pub user_id: UserId,
    /// Redeemable code, unique per user.
    pub code: String,
    /// Whole-number percentage taken off the checkout total.
    pub discount_percentage: i32,
    /// Instant after which the coupon no longer validates.
    pub expires_at: DateTime<Utc>,
    /// Cleared on redemption or expiry.
    pub is_active: bool,
}

impl Coupon {
    /// Whether the coupon is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}
