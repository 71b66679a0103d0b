//! Products, admin product forms and category derivation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{Price, PriceError, ProductId, Rating, RatingError};

/// A product as listed by `GET /products/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Free text; the API may omit it or send `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    pub price: Price,
    /// Free-text label. Products without one still appear in the grid.
    #[serde(default)]
    pub category: Option<String>,
    pub rating: Rating,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Distinct, defined category labels in first-seen order.
///
/// Feeds both the filter sidebar and the admin category selector.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    products
        .iter()
        .filter_map(|p| p.category.as_deref())
        .filter(|c| seen.insert(*c))
        .map(str::to_owned)
        .collect()
}

/// Body of a product create (`POST /products/`) or edit (`PUT /products/{id}/`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub category: String,
    pub rating: Rating,
}

/// Errors produced when an admin product form fails validation.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductFormError {
    #[error("product name is required")]
    MissingName,
    #[error("a category must be selected")]
    MissingCategory,
    #[error("invalid price: {0}")]
    Price(#[from] PriceError),
    #[error("invalid rating: {0}")]
    Rating(#[from] RatingError),
}

/// Raw text fields of the admin create/edit product form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub category: String,
    pub rating: String,
}

impl ProductForm {
    /// Prefill an edit form from an existing product.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            category: product.category.clone().unwrap_or_default(),
            rating: product.rating.to_string(),
        }
    }

    /// Validate the form into a submittable draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or category is blank, or if price or
    /// rating do not parse.
    pub fn parse(&self) -> Result<ProductDraft, ProductFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ProductFormError::MissingName);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(ProductFormError::MissingCategory);
        }
        let price = Price::parse(&self.price)?;
        let rating = Rating::parse(&self.rating)?;
        let description = self.description.trim();

        Ok(ProductDraft {
            name: name.to_owned(),
            description: (!description.is_empty()).then(|| description.to_owned()),
            price,
            category: category.to_owned(),
            rating,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i64, category: Option<&str>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_units(10),
            category: category.map(str::to_owned),
            rating: Rating::new(4.0).unwrap(),
        }
    }

    #[test]
    fn test_categories_first_seen_order_without_duplicates() {
        let products = vec![
            product(1, Some("Books")),
            product(2, Some("Games")),
            product(3, Some("Books")),
            product(4, Some("Audio")),
        ];
        assert_eq!(categories(&products), vec!["Books", "Games", "Audio"]);
    }

    #[test]
    fn test_categories_skip_missing_labels() {
        let products = vec![product(1, None), product(2, Some("Games")), product(3, None)];
        assert_eq!(categories(&products), vec!["Games"]);
    }

    #[test]
    fn test_product_deserializes_with_null_fields() {
        let json = r#"{"id":3,"name":"Lamp","description":null,"price":"12.50","category":null,"rating":4.26}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.description, "");
        assert_eq!(p.category, None);
        assert_eq!(p.rating.to_string(), "4.3");
    }

    #[test]
    fn test_product_deserializes_without_optional_fields() {
        let json = r#"{"id":3,"name":"Lamp","price":12,"rating":"3"}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.price, Price::from_units(12));
        assert_eq!(p.category, None);
    }

    #[test]
    fn test_form_parse_rounds_rating_and_trims() {
        let form = ProductForm {
            name: "  Desk  ".into(),
            description: String::new(),
            price: "149.99".into(),
            category: "Furniture".into(),
            rating: "4.44".into(),
        };
        let draft = form.parse().unwrap();
        assert_eq!(draft.name, "Desk");
        assert_eq!(draft.description, None);
        assert_eq!(draft.rating.to_string(), "4.4");
    }

    #[test]
    fn test_form_parse_reports_first_problem() {
        let mut form = ProductForm {
            name: "Desk".into(),
            price: "cheap".into(),
            category: "Furniture".into(),
            rating: "4".into(),
            ..ProductForm::default()
        };
        assert!(matches!(form.parse(), Err(ProductFormError::Price(_))));

        form.price = "10".into();
        form.category = " ".into();
        assert_eq!(form.parse(), Err(ProductFormError::MissingCategory));
    }

    #[test]
    fn test_form_from_product_shows_one_decimal_rating() {
        let form = ProductForm::from_product(&product(9, Some("Games")));
        assert_eq!(form.rating, "4.0");
        assert_eq!(form.category, "Games");
        assert_eq!(form.price, "10");
    }

    #[test]
    fn test_draft_omits_empty_description() {
        let draft = ProductDraft {
            name: "Desk".into(),
            description: None,
            price: Price::from_units(5),
            category: "Furniture".into(),
            rating: Rating::new(3.0).unwrap(),
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(value["category"], "Furniture");
    }
}
