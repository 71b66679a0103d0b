//! Catalog commands.

use std::io;

use shopfront_core::FilterCriteria;
use shopfront_storefront::{CatalogView, Storefront};

use super::CliError;
use crate::render;

/// Raw filter inputs, exactly as typed.
#[derive(Debug, Default)]
pub struct FilterArgs {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> Result<FilterCriteria, CliError> {
        let criteria = FilterCriteria::from_inputs(
            self.category.as_deref().unwrap_or_default(),
            self.min_price.as_deref().unwrap_or_default(),
            self.max_price.as_deref().unwrap_or_default(),
            self.min_rating.as_deref().unwrap_or_default(),
        )
        .map_err(shopfront_storefront::StorefrontError::from)?;
        Ok(criteria)
    }
}

/// Print one page of the filtered catalog.
pub async fn list(
    storefront: &Storefront,
    filters: &FilterArgs,
    page: usize,
    per_page: usize,
) -> Result<(), CliError> {
    let criteria = filters.criteria()?;
    let mut catalog = CatalogView::load(storefront).await?;
    catalog.set_criteria(criteria);

    let page = catalog.page(page, per_page);
    render::products(&mut io::stdout().lock(), storefront.config(), &page)?;
    Ok(())
}

/// Print the distinct product categories.
pub async fn categories(storefront: &Storefront) -> Result<(), CliError> {
    let catalog = CatalogView::load(storefront).await?;
    render::categories(&mut io::stdout().lock(), catalog.categories())?;
    Ok(())
}
