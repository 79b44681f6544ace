//! Product route handlers.
//!
//! The featured list is served read-through from the key-value store;
//! every write that can change it (toggle, delete) rewrites the cache
//! from the database so the next read is already warm.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use juniper_core::{Money, ProductId};

use crate::db::products::{NewProduct, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::services::cache::FeaturedCache;
use crate::state::AppState;

const RECOMMENDATION_COUNT: i64 = 3;

/// Wrapper for list responses.
#[derive(Debug, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
}

/// Create-product request body.
///
/// `image` is an optional base64 data URL; it is decoded and stored on
/// disk before the row is written.
#[derive(Debug, Deserialize)]
pub struct CreateProductPayload {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: String,
}

/// Full catalog (admin).
#[instrument(skip_all)]
pub async fn index(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<ProductList>> {
    let products = ProductRepository::new(state.pool()).all().await?;
    Ok(Json(ProductList { products }))
}

/// Featured products, read through the cache.
#[instrument(skip_all)]
pub async fn featured(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let cache = FeaturedCache::new(state.redis());

    if let Some(products) = cache.get().await? {
        return Ok(Json(products));
    }

    let products = ProductRepository::new(state.pool()).featured().await?;
    cache.rewrite(&products).await?;

    Ok(Json(products))
}

/// Create a product (admin).
#[instrument(skip(state, payload))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse> {
    // Reject bad prices before touching the image store.
    Money::from_decimal(payload.price)
        .map_err(|e| AppError::BadRequest(format!("invalid price: {e}")))?;

    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if payload.category.trim().is_empty() {
        return Err(AppError::BadRequest("category cannot be empty".to_string()));
    }

    let image_url = match &payload.image {
        Some(data_url) => Some(state.images().store_data_url(data_url).await?),
        None => None,
    };

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: payload.name.trim().to_string(),
            description: payload.description,
            price: payload.price,
            image_url,
            category: payload.category.trim().to_lowercase(),
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// Delete a product and its stored image (admin).
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let repo = ProductRepository::new(state.pool());

    let image_url = repo.delete(id).await?;
    if let Some(url) = image_url {
        state.images().remove_by_url(&url).await;
    }

    // The product may have been featured.
    refresh_featured_cache(&state).await?;

    tracing::info!(product_id = %id, "product deleted");

    Ok(Json(serde_json::json!({
        "message": "Product deleted successfully"
    })))
}

/// A small random sample for the recommendations rail (public).
#[instrument(skip_all)]
pub async fn recommendations(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool())
        .sample(RECOMMENDATION_COUNT)
        .await?;
    Ok(Json(products))
}

/// Products in one category (public).
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<ProductList>> {
    let products = ProductRepository::new(state.pool())
        .by_category(&category.to_lowercase())
        .await?;
    Ok(Json(ProductList { products }))
}

/// Flip a product's featured flag and rewrite the cache (admin).
#[instrument(skip(state))]
pub async fn toggle_featured(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .toggle_featured(id)
        .await?;

    refresh_featured_cache(&state).await?;

    Ok(Json(product))
}

/// Rewrite the cached featured list from the database.
async fn refresh_featured_cache(state: &AppState) -> Result<()> {
    let products = ProductRepository::new(state.pool()).featured().await?;
    FeaturedCache::new(state.redis()).rewrite(&products).await?;
    Ok(())
}
