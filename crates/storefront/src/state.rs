//! Client state shared across views.

use std::sync::Arc;

use tracing::debug;

use shopfront_core::{Cart, Product};

use crate::api::{ApiClient, ApiError, Profile};
use crate::cache::DataCache;
use crate::config::StorefrontConfig;
use crate::error::{Result, StorefrontError};
use crate::session::{FileSessionStore, Session, SessionHandle, SessionStore};

/// Everything a view needs: configuration, the API client, the session
/// handle and the shared read cache.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    config: StorefrontConfig,
    api: ApiClient,
    session: SessionHandle,
    cache: DataCache,
}

impl Storefront {
    /// Create storefront state over an explicit session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: StorefrontConfig, store: impl SessionStore + 'static) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let session = SessionHandle::open(store);
        let cache = DataCache::new(config.cache_ttl);

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                api,
                session,
                cache,
            }),
        })
    }

    /// Create storefront state persisting the session at
    /// `config.session_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: StorefrontConfig) -> Result<Self> {
        let store = FileSessionStore::new(config.session_path.clone());
        Self::new(config, store)
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the REST API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the session handle.
    #[must_use]
    pub fn session(&self) -> &SessionHandle {
        &self.inner.session
    }

    /// Get a reference to the shared read cache.
    #[must_use]
    pub fn cache(&self) -> &DataCache {
        &self.inner.cache
    }

    /// The current session, or `LoginRequired`.
    pub(crate) fn require_session(&self) -> Result<Session> {
        self.session()
            .current()
            .ok_or(StorefrontError::LoginRequired)
    }

    // =========================================================================
    // Cached reads
    // =========================================================================

    /// All products, authenticated if a session exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the products are not cached and the fetch fails.
    pub async fn products(&self) -> std::result::Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.cache().products().await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let session = self.session().current();
        let products = Arc::new(self.api().list_products(session.as_ref()).await?);
        self.cache().set_products(Arc::clone(&products)).await;
        Ok(products)
    }

    /// The signed-in user's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is not cached and the fetch fails.
    pub async fn profile(&self, session: &Session) -> std::result::Result<Profile, ApiError> {
        if let Some(profile) = self.cache().profile().await {
            debug!("Cache hit for profile");
            return Ok(profile);
        }

        let profile = self.api().profile(session).await?;
        self.cache().set_profile(profile.clone()).await;
        Ok(profile)
    }

    /// The signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not cached and the fetch fails.
    pub async fn cart(&self, session: &Session) -> std::result::Result<Cart, ApiError> {
        if let Some(cart) = self.cache().cart().await {
            debug!("Cache hit for cart");
            return Ok(cart);
        }

        let cart = self.api().cart(session).await?;
        self.cache().set_cart(cart.clone()).await;
        Ok(cart)
    }
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("api", &self.inner.api)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}
