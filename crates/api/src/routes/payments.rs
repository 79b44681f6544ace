//! Payment route handlers.
//!
//! Checkout totals are derived from the catalog at session-creation
//! time. The client sends product ids and quantities only; unit prices
//! never come from the request. The priced lines are echoed into the
//! session metadata so `checkout_success` can materialize the order
//! without trusting the client a second time.

use axum::{Json, extract::State};
use chrono::{Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use juniper_core::{Money, ProductId, UserId};

use crate::db::coupons::CouponRepository;
use crate::db::orders::{NewOrderItem, OrderRepository};
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Coupon;
use crate::services::payments::{LineItem, SessionItem};
use crate::state::AppState;

/// Spending enough in one session earns a gift coupon for the next one.
const GIFT_THRESHOLD_CENTS: i64 = 20_000;
const GIFT_DISCOUNT_PERCENT: i32 = 10;
const GIFT_VALIDITY_DAYS: i64 = 30;
const GIFT_CODE_LENGTH: usize = 6;

/// One requested cart line: id and quantity, no price.
#[derive(Debug, Deserialize)]
pub struct CheckoutItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Checkout-session request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutSessionPayload {
    pub items: Vec<CheckoutItem>,
    pub coupon_code: Option<String>,
}

/// Checkout-session response: where to send the shopper, and what
/// they'll pay.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    pub id: String,
    pub url: String,
    pub total_amount: rust_decimal::Decimal,
}

/// Checkout-success request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutSuccessPayload {
    pub session_id: String,
}

/// Create a hosted checkout session from the user's requested lines.
#[instrument(skip(user, state, payload))]
pub async fn create_checkout_session(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutSessionPayload>,
) -> Result<Json<CheckoutSessionResponse>> {
    if payload.items.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }
    if payload.items.iter().any(|item| item.quantity == 0) {
        return Err(AppError::BadRequest(
            "Quantities must be at least 1".to_string(),
        ));
    }

    let coupon = resolve_coupon(&state, user.id, payload.coupon_code.as_deref()).await?;

    let priced = price_items(&state, &payload.items).await?;

    let subtotal = priced
        .iter()
        .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.line_total))
        .map_err(|e| AppError::BadRequest(format!("invalid total: {e}")))?;

    let discount_percent = coupon
        .as_ref()
        .map(|c| u8::try_from(c.discount_percentage.clamp(0, 100)).unwrap_or(100));
    let total = match discount_percent {
        Some(percent) => subtotal.discounted_by(percent),
        None => subtotal,
    };

    let line_items: Vec<LineItem> = priced
        .iter()
        .map(|line| {
            LineItem::new(
                line.name.clone(),
                line.unit_price,
                line.quantity,
                line.image_url.clone(),
            )
        })
        .collect();
    let session_items: Vec<SessionItem> = priced
        .iter()
        .map(|line| SessionItem {
            product_id: line.product_id,
            quantity: i32::try_from(line.quantity).unwrap_or(i32::MAX),
            unit_price: line.unit_price.cents(),
        })
        .collect();

    let session = state
        .checkout()
        .create_session(
            user.id,
            &line_items,
            discount_percent,
            coupon.as_ref().map(|c| c.code.as_str()),
            &session_items,
        )
        .await?;

    // Big spenders earn a coupon for their next purchase.
    if total.cents() >= GIFT_THRESHOLD_CENTS {
        let coupon = mint_gift_coupon(&state, user.id).await?;
        tracing::info!(user_id = %user.id, code = %coupon.code, "gift coupon minted");
    }

    Ok(Json(CheckoutSessionResponse {
        id: session.id,
        url: session.url,
        total_amount: total.to_decimal(),
    }))
}

/// Record the order for a paid checkout session.
///
/// Idempotent: replaying a session id returns the already-created
/// order instead of writing a duplicate.
#[instrument(skip(state, payload))]
pub async fn checkout_success(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CheckoutSuccessPayload>,
) -> Result<Json<serde_json::Value>> {
    let session = state.checkout().retrieve_session(&payload.session_id).await?;

    if !session.is_paid() {
        return Err(AppError::BadRequest(
            "Payment has not been completed".to_string(),
        ));
    }

    let user_id = session.user_id()?;

    if let Some(code) = session.coupon_code() {
        CouponRepository::new(state.pool())
            .deactivate_code(user_id, code)
            .await?;
    }

    let items: Vec<NewOrderItem> = session
        .items()?
        .into_iter()
        .map(|item| NewOrderItem {
            product_id: item.product_id,
            quantity: item.quantity,
            unit_price: rust_decimal::Decimal::new(item.unit_price, 2),
        })
        .collect();

    let total = rust_decimal::Decimal::new(session.amount_total, 2);

    let order = OrderRepository::new(state.pool())
        .create_for_session(user_id, &session.id, total, &items)
        .await?;

    tracing::info!(order_id = %order.id, user_id = %user_id, "order recorded");

    Ok(Json(serde_json::json!({
        "message": "Payment successful, order created",
        "order_id": order.id,
    })))
}

/// A catalog-priced checkout line.
struct PricedLine {
    product_id: ProductId,
    name: String,
    image_url: Option<String>,
    unit_price: Money,
    line_total: Money,
    quantity: u32,
}

/// Price the requested lines against the catalog.
async fn price_items(state: &AppState, items: &[CheckoutItem]) -> Result<Vec<PricedLine>> {
    let ids: Vec<ProductId> = items.iter().map(|item| item.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_many(&ids).await?;

    items
        .iter()
        .map(|item| {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id)
                .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

            let unit_price = Money::from_decimal(product.price)
                .map_err(|e| AppError::Internal(format!("bad catalog price: {e}")))?;
            let line_total = unit_price
                .checked_mul(item.quantity)
                .map_err(|e| AppError::BadRequest(format!("invalid line total: {e}")))?;

            Ok(PricedLine {
                product_id: product.id,
                name: product.name.clone(),
                image_url: product.image_url.clone(),
                unit_price,
                line_total,
                quantity: item.quantity,
            })
        })
        .collect()
}

/// Look up and vet the coupon the client asked to apply.
async fn resolve_coupon(
    state: &AppState,
    user_id: UserId,
    code: Option<&str>,
) -> Result<Option<Coupon>> {
    let Some(code) = code else {
        return Ok(None);
    };

    let repo = CouponRepository::new(state.pool());
    let coupon = repo
        .find_active(user_id, code)
        .await?
        .ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))?;

    if coupon.is_expired(Utc::now()) {
        repo.deactivate(coupon.id).await?;
        return Err(AppError::NotFound("Coupon expired".to_string()));
    }

    Ok(Some(coupon))
}

/// Mint the user's gift coupon, replacing any previous one.
async fn mint_gift_coupon(state: &AppState, user_id: UserId) -> Result<Coupon> {
    let coupon = CouponRepository::new(state.pool())
        .upsert_gift(
            user_id,
            &generate_gift_code(),
            GIFT_DISCOUNT_PERCENT,
            Utc::now() + Duration::days(GIFT_VALIDITY_DAYS),
        )
        .await?;

    Ok(coupon)
}

/// `GIFT` plus six random uppercase alphanumerics.
fn generate_gift_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(rand::distr::Alphanumeric)
        .map(|b| char::from(b).to_ascii_uppercase())
        .take(GIFT_CODE_LENGTH)
        .collect();

    format!("GIFT{suffix}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_response_fields() {
        let response = CheckoutSessionResponse {
            id: "cs_123".to_string(),
            url: "https://pay.example.com/cs_123".to_string(),
            total_amount: rust_decimal::Decimal::new(17999, 2),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json.get("id").unwrap(), "cs_123");
        assert_eq!(json.get("total_amount").unwrap().as_str(), Some("179.99"));
    }

    #[test]
    fn test_gift_code_shape() {
        for _ in 0..100 {
            let code = generate_gift_code();
            assert_eq!(code.len(), 4 + GIFT_CODE_LENGTH);
            assert!(code.starts_with("GIFT"));
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_gift_codes_vary() {
        let a = generate_gift_code();
        let b = generate_gift_code();
        // 36^6 possibilities; a collision here means the RNG is broken.
        assert_ne!(a, b);
    }
}
