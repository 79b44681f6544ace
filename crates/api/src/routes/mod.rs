//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                     - Liveness check
//! GET  /health/ready               - Readiness check (Postgres + Redis)
//!
//! # Auth
//! POST /api/auth/signup            - Create account, set token cookies
//! POST /api/auth/login             - Verify credentials, set token cookies
//! POST /api/auth/logout            - Revoke refresh token, clear cookies
//! POST /api/auth/refresh           - Exchange refresh token for a new access token
//! GET  /api/auth/profile           - Current user (requires auth)
//!
//! # Products
//! GET    /api/products             - Full catalog (admin)
//! POST   /api/products             - Create product (admin)
//! GET    /api/products/featured    - Featured list (cached, public)
//! GET    /api/products/recommendations - Random sample (public)
//! GET    /api/products/category/{category} - By category (public)
//! PATCH  /api/products/{id}        - Toggle featured flag (admin)
//! DELETE /api/products/{id}        - Delete product and its image (admin)
//!
//! # Cart (requires auth)
//! GET    /api/cart                 - Cart lines with product data
//! POST   /api/cart                 - Add a product (or bump quantity)
//! DELETE /api/cart                 - Remove one product, or clear the cart
//! PUT    /api/cart/{product_id}    - Set a line's quantity (0 removes)
//!
//! # Coupons (requires auth)
//! GET  /api/coupons                - The user's active coupon, if any
//! POST /api/coupons/validate       - Validate a code for the user
//!
//! # Payments (requires auth)
//! POST /api/payments/checkout-session - Create a hosted checkout session
//! POST /api/payments/checkout-success - Materialize the order for a paid session
//!
//! # Analytics (admin)
//! GET  /api/analytics              - Store totals plus a 7-day daily breakdown
//! ```

pub mod analytics;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod health;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/refresh", post(auth::refresh))
        .route("/profile", get(auth::profile))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/featured", get(products::featured))
        .route("/recommendations", get(products::recommendations))
        .route("/category/{category}", get(products::by_category))
        .route(
            "/{id}",
            patch(products::toggle_featured).delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(cart::index).post(cart::add).delete(cart::remove),
        )
        .route("/{product_id}", put(cart::update_quantity))
}

/// Create the coupon routes router.
pub fn coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(coupons::current))
        .route("/validate", post(coupons::validate))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout-session", post(payments::create_checkout_session))
        .route("/checkout-success", post(payments::checkout_success))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::ready))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/cart", cart_routes())
        .nest("/api/coupons", coupon_routes())
        .nest("/api/payments", payment_routes())
        .route("/api/analytics", get(analytics::overview))
}
