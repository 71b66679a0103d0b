//! Product administration commands.

use std::io;

use clap::Args;

use shopfront_core::{ProductForm, ProductId};
use shopfront_storefront::{AdminPanel, CatalogView, Storefront};

use super::CliError;
use crate::render;

/// Product form fields. On edit, omitted fields keep the current value.
#[derive(Debug, Default, Args)]
pub struct ProductFields {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub rating: Option<String>,
}

impl ProductFields {
    /// Overlay the given fields onto `form`.
    fn apply_to(&self, mut form: ProductForm) -> ProductForm {
        let overlay = |slot: &mut String, value: Option<&String>| {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        };
        overlay(&mut form.name, self.name.as_ref());
        overlay(&mut form.description, self.description.as_ref());
        overlay(&mut form.price, self.price.as_ref());
        overlay(&mut form.category, self.category.as_ref());
        overlay(&mut form.rating, self.rating.as_ref());
        form
    }
}

pub async fn create(storefront: &Storefront, fields: &ProductFields) -> Result<(), CliError> {
    let mut catalog = CatalogView::load(storefront).await?;
    let mut panel = AdminPanel::open(&mut catalog)?;

    let form = fields.apply_to(ProductForm::default());
    panel.create(&form).await?;

    let count = panel.catalog().products().len();
    render::line(
        &mut io::stdout().lock(),
        &format!("Created {}. Catalog now has {count} products.", form.name.trim()),
    )?;
    Ok(())
}

pub async fn edit(
    storefront: &Storefront,
    id: ProductId,
    fields: &ProductFields,
) -> Result<(), CliError> {
    let mut catalog = CatalogView::load(storefront).await?;
    let mut panel = AdminPanel::open(&mut catalog)?;

    let current = panel.edit_form(id).ok_or(CliError::UnknownProduct(id))?;
    let form = fields.apply_to(current);
    panel.update(id, &form).await?;

    render::line(&mut io::stdout().lock(), &format!("Updated product {id}."))?;
    Ok(())
}

pub async fn delete(storefront: &Storefront, id: ProductId) -> Result<(), CliError> {
    let mut catalog = CatalogView::load(storefront).await?;
    let mut panel = AdminPanel::open(&mut catalog)?;

    panel.delete(id).await?;
    render::line(&mut io::stdout().lock(), &format!("Deleted product {id}."))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_keeps_omitted_fields() {
        let current = ProductForm {
            name: "Green Tea".to_string(),
            description: "Loose leaf".to_string(),
            price: "4.5".to_string(),
            category: "Tea".to_string(),
            rating: "4.2".to_string(),
        };
        let fields = ProductFields {
            price: Some("5".to_string()),
            ..ProductFields::default()
        };

        let form = fields.apply_to(current);
        assert_eq!(form.price, "5");
        assert_eq!(form.name, "Green Tea");
        assert_eq!(form.rating, "4.2");
    }
}
