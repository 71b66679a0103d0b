//! Product catalog view.

use std::sync::Arc;

use tracing::instrument;

use shopfront_core::{FilterCriteria, Page, Product, ProductId, categories};

use crate::api::Profile;
use crate::cache::CacheKey;
use crate::error::Result;
use crate::state::Storefront;

/// The product grid: the fetched products, the derived category list, the
/// active filter and whether the viewer may administer products.
///
/// The visible list is recomputed from the full list on every call, so
/// changing or resetting the filter never loses products.
#[derive(Debug)]
pub struct CatalogView {
    storefront: Storefront,
    products: Arc<Vec<Product>>,
    categories: Vec<String>,
    profile: Option<Profile>,
    criteria: FilterCriteria,
}

impl CatalogView {
    /// Fetch products and, when signed in, the profile.
    ///
    /// A profile failure is logged and the viewer treated as a non-admin.
    ///
    /// # Errors
    ///
    /// Returns an error if the product list cannot be fetched.
    #[instrument(skip_all)]
    pub async fn load(storefront: &Storefront) -> Result<Self> {
        let products = storefront.products().await?;
        let profile = load_profile(storefront).await;

        Ok(Self {
            storefront: storefront.clone(),
            categories: categories(&products),
            products,
            profile,
            criteria: FilterCriteria::default(),
        })
    }

    /// Re-fetch products and profile, bypassing the cache for products.
    ///
    /// On failure the previous products stay in place.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it.
    #[instrument(skip_all)]
    pub async fn refresh(&mut self) -> Result<()> {
        self.storefront.cache().invalidate(CacheKey::Products).await;

        let products = match self.storefront.products().await {
            Ok(products) => products,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to refresh products, keeping previous list");
                return Err(e.into());
            }
        };

        self.categories = categories(&products);
        self.products = products;
        self.profile = load_profile(&self.storefront).await;
        Ok(())
    }

    /// Every fetched product, unfiltered, in server order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// True only when the fetched profile marks the viewer as a superuser.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.profile.as_ref().is_some_and(|p| p.is_superuser)
    }

    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn reset_filters(&mut self) {
        self.criteria.reset();
    }

    /// Products matching the active filter, in server order.
    #[must_use]
    pub fn visible(&self) -> Vec<Product> {
        self.criteria.apply(&self.products)
    }

    /// One page of the visible products.
    #[must_use]
    pub fn page(&self, number: usize, per_page: usize) -> Page<Product> {
        Page::of(&self.visible(), number, per_page)
    }

    /// Add one unit of a product to the signed-in user's cart.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` without any request when signed out, or the
    /// API error if the server rejects the addition.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_to_cart(&self, product_id: ProductId) -> Result<()> {
        let session = self.storefront.require_session()?;
        self.storefront
            .api()
            .add_to_cart(&session, product_id, 1)
            .await?;
        self.storefront.cache().invalidate(CacheKey::Cart).await;
        Ok(())
    }

    /// Drop a product from the local list after a successful delete.
    pub fn remove_local(&mut self, id: ProductId) -> Option<Product> {
        let products = Arc::make_mut(&mut self.products);
        let index = products.iter().position(|p| p.id == id)?;
        let removed = products.remove(index);
        self.categories = categories(&self.products);
        Some(removed)
    }

    pub(crate) const fn storefront(&self) -> &Storefront {
        &self.storefront
    }
}

async fn load_profile(storefront: &Storefront) -> Option<Profile> {
    let session = storefront.session().current()?;
    match storefront.profile(&session).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profile, treating viewer as non-admin");
            None
        }
    }
}
