//! Application state shared across handlers.

use std::sync::Arc;

use redis::aio::ConnectionManager;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::images::ImageStore;
use crate::services::payments::CheckoutClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    redis: ConnectionManager,
    checkout: CheckoutClient,
    images: ImageStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - API configuration
    /// * `pool` - `PostgreSQL` connection pool
    /// * `redis` - Redis connection manager
    ///
    /// # Errors
    ///
    /// Returns an error if the checkout provider client cannot be built.
    pub fn new(
        config: ApiConfig,
        pool: PgPool,
        redis: ConnectionManager,
    ) -> Result<Self, crate::services::payments::PaymentError> {
        let checkout = CheckoutClient::new(&config.checkout, &config.client_url)?;
        let images = ImageStore::new(config.upload_dir.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                redis,
                checkout,
                images,
            }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a handle to the Redis connection.
    ///
    /// `ConnectionManager` multiplexes over one connection, so cloning a
    /// handle per request is cheap.
    #[must_use]
    pub fn redis(&self) -> ConnectionManager {
        self.inner.redis.clone()
    }

    /// Get a reference to the checkout provider client.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutClient {
        &self.inner.checkout
    }

    /// Get a reference to the product image store.
    #[must_use]
    pub fn images(&self) -> &ImageStore {
        &self.inner.images
    }
}
