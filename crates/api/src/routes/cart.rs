//! Cart route handlers.
//!
//! Every endpoint requires a signed-in user and responds with the full
//! cart so the client can re-render without a second round trip.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use juniper_core::ProductId;

use crate::db::carts::CartRepository;
use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::state::AppState;

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartPayload {
    pub product_id: ProductId,
}

/// Remove-from-cart request body.
///
/// A missing or null `product_id` clears the whole cart.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveFromCartPayload {
    pub product_id: Option<ProductId>,
}

/// Set-quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityPayload {
    pub quantity: i32,
}

/// The user's cart lines with product details.
#[instrument(skip_all)]
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartLine>>> {
    let lines = CartRepository::new(state.pool()).lines(user.id).await?;
    Ok(Json(lines))
}

/// Add one unit of a product, creating the line if absent.
#[instrument(skip(user, state))]
pub async fn add(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<AddToCartPayload>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());
    repo.add(user.id, payload.product_id).await?;

    let lines = repo.lines(user.id).await?;
    Ok(Json(lines))
}

/// Remove one product from the cart, or clear it entirely.
#[instrument(skip(user, state))]
pub async fn remove(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<RemoveFromCartPayload>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());

    match payload.product_id {
        Some(product_id) => {
            // Removing an absent line is a no-op, matching clear-all.
            repo.remove(user.id, product_id).await?;
        }
        None => repo.clear(user.id).await?,
    }

    let lines = repo.lines(user.id).await?;
    Ok(Json(lines))
}

/// Set a line's quantity; zero removes the line.
#[instrument(skip(user, state))]
pub async fn update_quantity(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(payload): Json<UpdateQuantityPayload>,
) -> Result<Json<Vec<CartLine>>> {
    let repo = CartRepository::new(state.pool());
    repo.set_quantity(user.id, product_id, payload.quantity)
        .await?;

    let lines = repo.lines(user.id).await?;
    Ok(Json(lines))
}
