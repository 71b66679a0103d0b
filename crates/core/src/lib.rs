//! Shopfront Core - Shared domain types and pure storefront logic.
//!
//! This crate provides the types and algorithms used across all Shopfront
//! components:
//! - `storefront` - API client, session store and views over the REST API
//! - `cli` - The `shopfront` terminal front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no storage. Everything here can be recomputed from its inputs.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, ratings and emails
//! - [`product`] - Products, drafts and category derivation
//! - [`filter`] - The product filter engine
//! - [`cart`] - Cart line items and local reconciliation
//! - [`page`] - Windowing a list into pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod filter;
pub mod page;
pub mod product;
pub mod types;

pub use cart::{Cart, CartError, CartItem, CartProduct};
pub use filter::{FilterCriteria, FilterError};
pub use page::Page;
pub use product::{Product, ProductDraft, ProductForm, ProductFormError, categories};
pub use types::*;
