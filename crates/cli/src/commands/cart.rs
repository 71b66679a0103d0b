//! Cart commands.

use std::io;

use shopfront_core::{CartItemId, ProductId};
use shopfront_storefront::{CartView, CatalogView, QuantityOutcome, Storefront};

use super::CliError;
use crate::render;

pub async fn show(storefront: &Storefront) -> Result<(), CliError> {
    let view = CartView::load(storefront).await?;
    render::cart(&mut io::stdout().lock(), storefront.config(), view.cart())?;
    Ok(())
}

/// Add one unit of a product.
pub async fn add(storefront: &Storefront, product_id: ProductId) -> Result<(), CliError> {
    let catalog = CatalogView::load(storefront).await?;
    let name = catalog
        .find(product_id)
        .map(|p| p.name.clone())
        .ok_or(CliError::UnknownProduct(product_id))?;

    catalog.add_to_cart(product_id).await?;
    render::line(&mut io::stdout().lock(), &format!("Added {name} to cart."))?;
    Ok(())
}

pub async fn increment(storefront: &Storefront, id: CartItemId) -> Result<(), CliError> {
    let mut view = CartView::load(storefront).await?;
    let outcome = view.increment(id).await?;
    finish(storefront, &view, &outcome)
}

pub async fn decrement(storefront: &Storefront, id: CartItemId) -> Result<(), CliError> {
    let mut view = CartView::load(storefront).await?;
    let outcome = view.decrement(id).await?;
    finish(storefront, &view, &outcome)
}

pub async fn set_quantity(
    storefront: &Storefront,
    id: CartItemId,
    quantity: i64,
) -> Result<(), CliError> {
    let mut view = CartView::load(storefront).await?;
    let outcome = view.set_quantity(id, quantity).await?;
    finish(storefront, &view, &outcome)
}

pub async fn remove(storefront: &Storefront, id: CartItemId) -> Result<(), CliError> {
    let mut view = CartView::load(storefront).await?;
    let removed = view.remove(id).await?;

    let mut out = io::stdout().lock();
    render::line(&mut out, &format!("Removed {}.", removed.product.name))?;
    render::cart(&mut out, storefront.config(), view.cart())?;
    Ok(())
}

/// Report a quantity change. A rejected change is not an error: the cart is
/// simply left as it was.
fn finish(
    storefront: &Storefront,
    view: &CartView,
    outcome: &QuantityOutcome,
) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    if let QuantityOutcome::Rejected(reason) = outcome {
        render::line(&mut out, &format!("Unchanged: {reason}"))?;
    }
    render::cart(&mut out, storefront.config(), view.cart())?;
    Ok(())
}
