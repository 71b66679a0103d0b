//! Product filter engine.
//!
//! Filtering is a pure function of the full product list and a
//! [`FilterCriteria`] value. Re-applying the same criteria yields the same
//! result, and resetting the criteria restores the original list in its
//! original order.

use core::str::FromStr;

use rust_decimal::Decimal;

use crate::product::Product;
use crate::types::{Price, PriceError, RatingError};

/// Errors that can occur when building criteria from raw form input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("min price: {0}")]
    MinPrice(PriceError),
    #[error("max price: {0}")]
    MaxPrice(PriceError),
    #[error("min rating: {0}")]
    MinRating(RatingError),
}

/// Active filter constraints. `None` imposes no constraint.
///
/// Bounds are raw numbers, not [`Price`] or [`Rating`](crate::types::Rating)
/// values: they may be negative, and a rating bound is compared unrounded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Exact-match category label.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
    /// Inclusive lower rating bound.
    pub min_rating: Option<f64>,
}

impl FilterCriteria {
    /// Build criteria from the raw text of the sidebar inputs.
    ///
    /// Blank inputs mean "no constraint", matching how an empty form field
    /// behaves.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] naming the first field whose non-blank
    /// text is not a valid number.
    pub fn from_inputs(
        category: &str,
        min_price: &str,
        max_price: &str,
        min_rating: &str,
    ) -> Result<Self, FilterError> {
        let category = category.trim();
        Ok(Self {
            category: (!category.is_empty()).then(|| category.to_owned()),
            min_price: optional(min_price, price_bound).map_err(FilterError::MinPrice)?,
            max_price: optional(max_price, price_bound).map_err(FilterError::MaxPrice)?,
            min_rating: optional(min_rating, rating_bound).map_err(FilterError::MinRating)?,
        })
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.is_empty()).then_some(category);
        self
    }

    #[must_use]
    pub const fn with_min_price(mut self, price: Price) -> Self {
        self.min_price = Some(price.amount());
        self
    }

    #[must_use]
    pub const fn with_max_price(mut self, price: Price) -> Self {
        self.max_price = Some(price.amount());
        self
    }

    #[must_use]
    pub const fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    /// True when no constraint is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
    }

    /// Clear every constraint.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a single product satisfies every set constraint.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category.as_deref() != Some(category.as_str())
        {
            return false;
        }
        if let Some(min) = self.min_price
            && product.price.amount() < min
        {
            return false;
        }
        if let Some(max) = self.max_price
            && product.price.amount() > max
        {
            return false;
        }
        if let Some(min) = self.min_rating
            && product.rating.value() < min
        {
            return false;
        }
        true
    }

    /// The products satisfying every constraint, in their original order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect()
    }
}

fn optional<T, E>(raw: &str, parse: impl Fn(&str) -> Result<T, E>) -> Result<Option<T>, E> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse(raw).map(Some)
    }
}

fn price_bound(raw: &str) -> Result<Decimal, PriceError> {
    let trimmed = raw.trim();
    Decimal::from_str(trimmed).map_err(|_| PriceError::Invalid(trimmed.to_owned()))
}

fn rating_bound(raw: &str) -> Result<f64, RatingError> {
    let trimmed = raw.trim();
    let value = trimmed
        .parse::<f64>()
        .map_err(|_| RatingError::Invalid(trimmed.to_owned()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RatingError::NotFinite)
    }
}
