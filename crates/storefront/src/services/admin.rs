//! Product administration for superusers.

use tracing::instrument;

use shopfront_core::{ProductForm, ProductId};

use crate::cache::CacheKey;
use crate::error::{Result, StorefrontError};
use crate::services::catalog::CatalogView;
use crate::session::Session;

/// Create, edit and delete products on top of a loaded catalog.
///
/// Only obtainable for a viewer whose profile says superuser. After a
/// successful create or update the catalog is re-fetched explicitly; after
/// a delete the product is dropped from the local list.
#[derive(Debug)]
pub struct AdminPanel<'a> {
    catalog: &'a mut CatalogView,
    session: Session,
}

impl<'a> AdminPanel<'a> {
    /// Open the admin panel over `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` when signed out and `NotAdmin` when the
    /// profile is missing or not a superuser.
    pub fn open(catalog: &'a mut CatalogView) -> Result<Self> {
        let session = catalog.storefront().require_session()?;
        if !catalog.is_admin() {
            return Err(StorefrontError::NotAdmin);
        }
        Ok(Self { catalog, session })
    }

    /// The catalog the panel edits.
    #[must_use]
    pub fn catalog(&self) -> &CatalogView {
        self.catalog
    }

    /// Categories offered by the form's category selector.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        self.catalog.categories()
    }

    /// A form prefilled from an existing product, for editing.
    #[must_use]
    pub fn edit_form(&self, id: ProductId) -> Option<ProductForm> {
        self.catalog.find(id).map(ProductForm::from_product)
    }

    /// Validate and submit a new product, then reload the catalog.
    ///
    /// A failed reload is logged and the previous list kept; the product is
    /// already saved.
    ///
    /// # Errors
    ///
    /// Returns the form error without any request if validation fails,
    /// otherwise the API error from the submit.
    #[instrument(skip_all, fields(name = %form.name))]
    pub async fn create(&mut self, form: &ProductForm) -> Result<()> {
        let draft = form.parse()?;
        self.catalog
            .storefront()
            .api()
            .create_product(&self.session, &draft)
            .await?;
        tracing::info!("Product created");
        self.reload().await;
        Ok(())
    }

    /// Validate and submit an edit, then reload the catalog.
    ///
    /// As with [`create`](Self::create), a failed reload is logged only.
    ///
    /// # Errors
    ///
    /// Returns the form error without any request if validation fails,
    /// otherwise the API error from the submit.
    #[instrument(skip(self, form), fields(product_id = %id))]
    pub async fn update(&mut self, id: ProductId, form: &ProductForm) -> Result<()> {
        let draft = form.parse()?;
        self.catalog
            .storefront()
            .api()
            .update_product(&self.session, id, &draft)
            .await?;
        tracing::info!("Product updated");
        self.reload().await;
        Ok(())
    }

    /// Delete a product and drop it from the local list.
    ///
    /// # Errors
    ///
    /// Returns the API error if the delete fails; the local list is then
    /// left untouched.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete(&mut self, id: ProductId) -> Result<()> {
        let storefront = self.catalog.storefront().clone();
        storefront.api().delete_product(&self.session, id).await?;
        storefront.cache().invalidate(CacheKey::Products).await;
        self.catalog.remove_local(id);
        tracing::info!("Product deleted");
        Ok(())
    }

    async fn reload(&mut self) {
        if let Err(e) = self.catalog.refresh().await {
            tracing::warn!(error = %e, "Product saved but catalog reload failed");
        }
    }
}
