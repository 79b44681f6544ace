//! Read-through cache for the featured-products list.
//!
//! The list lives under a single key in the key-value store with no
//! expiry. Writers that change which products are featured call
//! [`FeaturedCache::rewrite`] so readers never serve a stale list.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::warn;

use crate::models::Product;

const FEATURED_KEY: &str = "featured_products";

/// Cache over the featured-products list.
#[derive(Clone)]
pub struct FeaturedCache {
    redis: ConnectionManager,
}

impl FeaturedCache {
    /// Create a new cache handle.
    #[must_use]
    pub const fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    /// The cached list, if present and readable.
    ///
    /// A payload that fails to deserialize is treated as a miss; the
    /// next `rewrite` will replace it.
    ///
    /// # Errors
    ///
    /// Returns `redis::RedisError` if the store is unreachable.
    pub async fn get(&self) -> Result<Option<Vec<Product>>, redis::RedisError> {
        let mut conn = self.redis.clone();
        let raw: Option<String> = conn.get(FEATURED_KEY).await?;

        Ok(raw.as_deref().and_then(decode))
    }

    /// Replace the cached list.
    ///
    /// # Errors
    ///
    /// Returns `redis::RedisError` if the write fails.
    pub async fn rewrite(&self, products: &[Product]) -> Result<(), redis::RedisError> {
        let payload = encode(products)?;

        let mut conn = self.redis.clone();
        let () = conn.set(FEATURED_KEY, payload).await?;

        Ok(())
    }

    /// Drop the cached list so the next read goes to the database.
    ///
    /// # Errors
    ///
    /// Returns `redis::RedisError` if the delete fails.
    pub async fn invalidate(&self) -> Result<(), redis::RedisError> {
        let mut conn = self.redis.clone();
        let () = conn.del(FEATURED_KEY).await?;

        Ok(())
    }
}

fn encode(products: &[Product]) -> Result<String, redis::RedisError> {
    serde_json::to_string(products).map_err(|e| {
        redis::RedisError::from((
            redis::ErrorKind::TypeError,
            "featured products are not serializable",
            e.to_string(),
        ))
    })
}

fn decode(raw: &str) -> Option<Vec<Product>> {
    match serde_json::from_str(raw) {
        Ok(products) => Some(products),
        Err(e) => {
            warn!(error = %e, "discarding unreadable featured-products cache entry");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use juniper_core::ProductId;

    use super::*;

    fn product(id: i64, name: &str, featured: bool) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            description: "A fine product".to_string(),
            price: Decimal::new(2499, 2),
            image_url: Some(format!("/uploads/{id}.png")),
            category: "outdoors".to_string(),
            is_featured: featured,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_rewritten_payload_is_what_the_next_read_sees() {
        let products = vec![product(1, "Tent", true), product(2, "Lantern", true)];

        let payload = encode(&products).unwrap();
        let read_back = decode(&payload).unwrap();

        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back.first().unwrap().id, ProductId::new(1));
        assert_eq!(read_back.first().unwrap().name, "Tent");
        assert_eq!(read_back.first().unwrap().price, Decimal::new(2499, 2));
        assert!(read_back.iter().all(|p| p.is_featured));
    }

    #[test]
    fn test_empty_list_round_trips() {
        let payload = encode(&[]).unwrap();
        assert!(decode(&payload).unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_payload_is_a_miss() {
        assert!(decode("not json").is_none());
        assert!(decode("{\"wrong\": \"shape\"}").is_none());
    }
}
