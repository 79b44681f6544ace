//! Coupon route handlers.
//!
//! Coupons are per-user: a code only validates for the user it was
//! minted for. Expiry is checked lazily at validation time, and an
//! expired coupon is deactivated on the spot.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::coupons::CouponRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Coupon;
use crate::state::AppState;

/// Validate-coupon request body.
#[derive(Debug, Deserialize)]
pub struct ValidatePayload {
    pub code: String,
}

/// A successfully validated coupon.
#[derive(Debug, Serialize)]
pub struct ValidatedCoupon {
    pub message: String,
    pub code: String,
    pub discount_percentage: i32,
}

/// The user's active coupon, or null.
#[instrument(skip_all)]
pub async fn current(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Option<Coupon>>> {
    let coupon = CouponRepository::new(state.pool())
        .get_for_user(user.id)
        .await?
        .filter(|c| c.is_active);

    Ok(Json(coupon))
}

/// Check a code for the signed-in user.
#[instrument(skip(user, state, payload))]
pub async fn validate(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<ValidatePayload>,
) -> Result<Json<ValidatedCoupon>> {
    let repo = CouponRepository::new(state.pool());

    let coupon = repo
        .find_active(user.id, &payload.code)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

    if coupon.is_expired(Utc::now()) {
        repo.deactivate(coupon.id).await?;
        return Err(AppError::NotFound("Coupon expired".to_string()));
    }

    Ok(Json(ValidatedCoupon {
        message: "Coupon is valid".to_string(),
        code: coupon.code,
        discount_percentage: coupon.discount_percentage,
    }))
}
