//! Shared read cache for API responses.
//!
//! Every view reads products, the profile and the cart through one cache
//! keyed by endpoint, so two views never fetch the same thing twice inside
//! the TTL. Mutations invalidate the key they touched; signing in or out
//! invalidates everything.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use shopfront_core::{Cart, Product};

use crate::api::Profile;

/// Cache key: one per cached endpoint.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Products,
    Profile,
    Cart,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Arc<Vec<Product>>),
    Profile(Profile),
    Cart(Cart),
}

/// Time-bounded cache of the last successful reads.
#[derive(Clone)]
pub struct DataCache {
    cache: Cache<CacheKey, CacheValue>,
}

impl DataCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(16).time_to_live(ttl).build(),
        }
    }

    pub async fn products(&self) -> Option<Arc<Vec<Product>>> {
        match self.cache.get(&CacheKey::Products).await {
            Some(CacheValue::Products(products)) => Some(products),
            _ => None,
        }
    }

    pub async fn set_products(&self, products: Arc<Vec<Product>>) {
        self.cache
            .insert(CacheKey::Products, CacheValue::Products(products))
            .await;
    }

    pub async fn profile(&self) -> Option<Profile> {
        match self.cache.get(&CacheKey::Profile).await {
            Some(CacheValue::Profile(profile)) => Some(profile),
            _ => None,
        }
    }

    pub async fn set_profile(&self, profile: Profile) {
        self.cache
            .insert(CacheKey::Profile, CacheValue::Profile(profile))
            .await;
    }

    pub async fn cart(&self) -> Option<Cart> {
        match self.cache.get(&CacheKey::Cart).await {
            Some(CacheValue::Cart(cart)) => Some(cart),
            _ => None,
        }
    }

    pub async fn set_cart(&self, cart: Cart) {
        self.cache.insert(CacheKey::Cart, CacheValue::Cart(cart)).await;
    }

    /// Drop one cached entity.
    pub async fn invalidate(&self, key: CacheKey) {
        tracing::debug!(?key, "Invalidating cache entry");
        self.cache.invalidate(&key).await;
    }

    /// Drop every cached entity.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

impl std::fmt::Debug for DataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataCache")
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use shopfront_core::{Price, ProductId, Rating};

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_units(10),
            category: Some("Tea".to_string()),
            rating: Rating::default(),
        }
    }

    fn profile() -> Profile {
        Profile {
            username: "alice".to_string(),
            is_superuser: false,
        }
    }

    #[tokio::test]
    async fn test_invalidate_only_touches_one_key() {
        let cache = DataCache::new(Duration::from_secs(60));
        cache.set_products(Arc::new(vec![product(1)])).await;
        cache.set_profile(profile()).await;
        cache.set_cart(Cart::default()).await;

        cache.invalidate(CacheKey::Cart).await;

        assert!(cache.cart().await.is_none());
        assert_eq!(cache.products().await.map(|p| p.len()), Some(1));
        assert_eq!(cache.profile().await, Some(profile()));
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = DataCache::new(Duration::from_secs(60));
        cache.set_products(Arc::new(vec![product(1), product(2)])).await;
        cache.set_profile(profile()).await;

        cache.invalidate_all().await;

        assert!(cache.products().await.is_none());
        assert!(cache.profile().await.is_none());
    }
}
