//! Cart view.

use tracing::instrument;

use shopfront_core::{Cart, CartError, CartItem, CartItemId, Price};

use crate::cache::CacheKey;
use crate::error::Result;
use crate::session::Session;
use crate::state::Storefront;

/// Result of a quantity change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantityOutcome {
    /// The server accepted the change; this is its version of the line item.
    Updated(CartItem),
    /// The change was refused locally. Nothing was sent and nothing changed.
    Rejected(CartError),
}

/// The signed-in user's cart.
#[derive(Debug)]
pub struct CartView {
    storefront: Storefront,
    session: Session,
    cart: Cart,
}

impl CartView {
    /// Fetch the cart (through the shared cache).
    ///
    /// # Errors
    ///
    /// Returns `LoginRequired` when signed out, or the fetch error.
    #[instrument(skip_all)]
    pub async fn load(storefront: &Storefront) -> Result<Self> {
        let session = storefront.require_session()?;
        let cart = storefront.cart(&session).await?;
        Ok(Self {
            storefront: storefront.clone(),
            session,
            cart,
        })
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.total()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.cart.line_count()
    }

    /// Raise a line item's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns the API error if the update request fails.
    pub async fn increment(&mut self, id: CartItemId) -> Result<QuantityOutcome> {
        let plan = self.cart.increment_target(id);
        self.apply(id, plan).await
    }

    /// Lower a line item's quantity by one. Decrementing from 1 is rejected.
    ///
    /// # Errors
    ///
    /// Returns the API error if the update request fails.
    pub async fn decrement(&mut self, id: CartItemId) -> Result<QuantityOutcome> {
        let plan = self.cart.decrement_target(id);
        self.apply(id, plan).await
    }

    /// Set a line item's quantity. Zero or below is rejected.
    ///
    /// # Errors
    ///
    /// Returns the API error if the update request fails.
    pub async fn set_quantity(&mut self, id: CartItemId, quantity: i64) -> Result<QuantityOutcome> {
        let plan = self.cart.plan_quantity(id, quantity);
        self.apply(id, plan).await
    }

    #[instrument(skip(self, plan), fields(item_id = %id))]
    async fn apply(
        &mut self,
        id: CartItemId,
        plan: std::result::Result<u32, CartError>,
    ) -> Result<QuantityOutcome> {
        let quantity = match plan {
            Ok(quantity) => quantity,
            Err(e) => {
                tracing::debug!(error = %e, "Quantity change rejected locally");
                return Ok(QuantityOutcome::Rejected(e));
            }
        };

        let updated = self
            .storefront
            .api()
            .update_cart_item(&self.session, id, quantity)
            .await?;

        if !self.cart.replace(updated.clone()) {
            tracing::warn!(returned_id = %updated.id, "Server returned an unknown cart item");
        }
        self.storefront.cache().invalidate(CacheKey::Cart).await;
        Ok(QuantityOutcome::Updated(updated))
    }

    /// Delete a line item, then drop it locally.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownItem` without any request if `id` is not in
    /// the cart, or the API error if the delete fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn remove(&mut self, id: CartItemId) -> Result<CartItem> {
        if self.cart.get(id).is_none() {
            return Err(CartError::UnknownItem(id).into());
        }

        self.storefront
            .api()
            .remove_cart_item(&self.session, id)
            .await?;
        self.storefront.cache().invalidate(CacheKey::Cart).await;

        self.cart
            .remove(id)
            .ok_or_else(|| CartError::UnknownItem(id).into())
    }
}
