//! Views over the storefront API.
//!
//! # Services
//!
//! - `catalog` - Product grid: filters, pagination, categories, add to cart
//! - `admin` - Product create/edit/delete for superusers
//! - `cart` - Line items, quantity changes, removal, total
//! - `auth` - Login/logout/signup state machine
//! - `nav` - Username and cart badge for the navigation bar
//!
//! Every view is handed a [`Storefront`](crate::state::Storefront) and reads
//! the session from it per call; only `auth` changes the session.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod nav;

pub use admin::AdminPanel;
pub use auth::{AuthFailure, AuthFlow, AuthState};
pub use cart::{CartView, QuantityOutcome};
pub use catalog::CatalogView;
pub use nav::NavSummary;
