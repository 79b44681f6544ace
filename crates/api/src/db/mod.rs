//! Database and key-value store access.
//!
//! # `PostgreSQL`
//!
//! All persistent records live in one database:
//!
//! - `app_user` - Accounts and credential hashes
//! - `product` - Catalog
//! - `cart_item` - One row per (user, product) cart line
//! - `coupon` - One gift coupon per user
//! - `order` / `order_item` - Materialized paid checkouts
//!
//! Queries use runtime `query_as`/`FromRow` bindings; migrations live in
//! `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p juniper-cli -- migrate
//! ```
//!
//! # Redis
//!
//! Two kinds of keys, both owned by the services layer:
//!
//! - `refresh_token:{user_id}` - Mirror of the active refresh token,
//!   expiring with the token itself
//! - `featured_products` - JSON snapshot of the featured catalog subset

pub mod carts;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced row does not exist.
    #[error("not found")]
    NotFound,

    /// A stored value failed domain validation on the way out.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Create a Redis connection manager.
///
/// The manager reconnects on failure and multiplexes commands over a single
/// connection, so one handle serves the whole process.
///
/// # Errors
///
/// Returns `redis::RedisError` if the URL is invalid or the initial
/// connection fails.
pub async fn create_redis(
    redis_url: &secrecy::SecretString,
) -> Result<ConnectionManager, redis::RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(3)
        .set_connection_timeout(Duration::from_secs(5));

    let client = redis::Client::open(redis_url.expose_secret())?;
    client.get_connection_manager_with_config(config).await
}

/// Map a sqlx error to `Conflict` when it is a unique violation.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
