//! Cart line items and local reconciliation.
//!
//! The server owns the cart. Locally we keep the last fetched line items
//! and patch them as mutating calls succeed, so a quantity change or a
//! removal never forces a full refetch:
//!
//! - a quantity change is planned first and rejected if the target is not
//!   positive, so no request is ever issued for `0` or below
//! - a successful update replaces exactly one line item, in place, by id
//! - a removal excises one line item by id and leaves the rest untouched
//! - the total is recomputed from the line items on every call

use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, Price, ProductId};

/// Errors raised by local cart reconciliation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The requested quantity is zero or negative.
    #[error("quantity must be at least 1 (requested {0})")]
    NonPositiveQuantity(i64),
    /// The requested quantity does not fit a line item.
    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),
    /// No line item with this id is in the cart.
    #[error("no cart item with id {0}")]
    UnknownItem(CartItemId),
}

/// The product summary embedded in a cart line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
}

/// One cart entry: a product and a positive quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product: CartProduct,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price.times(self.quantity)
    }
}

/// The locally held cart contents, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new(items: Vec<CartItem>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of line items (what the navigation badge shows).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across line items.
    #[must_use]
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of unit price times quantity over every line item.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Validate a quantity change before anything is sent to the server.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::UnknownItem`] if `id` is not in the cart and
    /// [`CartError::NonPositiveQuantity`] if `target` is zero or negative.
    pub fn plan_quantity(&self, id: CartItemId, target: i64) -> Result<u32, CartError> {
        if self.get(id).is_none() {
            return Err(CartError::UnknownItem(id));
        }
        if target <= 0 {
            return Err(CartError::NonPositiveQuantity(target));
        }
        u32::try_from(target).map_err(|_| CartError::QuantityTooLarge(target))
    }

    /// Current quantity plus one.
    ///
    /// # Errors
    ///
    /// See [`Cart::plan_quantity`].
    pub fn increment_target(&self, id: CartItemId) -> Result<u32, CartError> {
        let current = self.current_quantity(id)?;
        self.plan_quantity(id, current + 1)
    }

    /// Current quantity minus one. Decrementing from 1 is rejected.
    ///
    /// # Errors
    ///
    /// See [`Cart::plan_quantity`].
    pub fn decrement_target(&self, id: CartItemId) -> Result<u32, CartError> {
        let current = self.current_quantity(id)?;
        self.plan_quantity(id, current - 1)
    }

    fn current_quantity(&self, id: CartItemId) -> Result<i64, CartError> {
        self.get(id)
            .map(|item| i64::from(item.quantity))
            .ok_or(CartError::UnknownItem(id))
    }

    /// Swap in the server's version of a line item, keeping its position.
    ///
    /// Returns false if no line item has the same id.
    pub fn replace(&mut self, updated: CartItem) -> bool {
        match self.items.iter_mut().find(|item| item.id == updated.id) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Drop a line item by id, returning it if it was present.
    pub fn remove(&mut self, id: CartItemId) -> Option<CartItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::new(items)
    }
}
