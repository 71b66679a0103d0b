//! Shopfront storefront client library.
//!
//! Talks to the shop's REST API and holds the client-side state the views
//! work on: the persisted session, a shared read cache, and the catalog,
//! cart, admin, auth and navigation views.
//!
//! ```rust,ignore
//! let storefront = Storefront::from_config(StorefrontConfig::from_env()?)?;
//! let mut catalog = CatalogView::load(&storefront).await?;
//! catalog.set_criteria(FilterCriteria::from_inputs("Tea", "", "", "4")?);
//! for product in catalog.page(1, 12).items { /* ... */ }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod services;
pub mod session;
pub mod state;

pub use config::StorefrontConfig;
pub use error::{Result, StorefrontError};
pub use services::{
    AdminPanel, AuthFailure, AuthFlow, AuthState, CartView, CatalogView, NavSummary,
    QuantityOutcome,
};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionHandle, SessionStore};
pub use state::Storefront;
