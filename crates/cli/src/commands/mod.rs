//! Command implementations.
//!
//! Each command builds the view it needs from the shared
//! [`Storefront`](shopfront_storefront::Storefront), performs one action and
//! renders the result to stdout.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod products;

use thiserror::Error;

use shopfront_storefront::{AuthFailure, StorefrontError};

/// Errors that end a command with a non-zero exit status.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    /// Login or signup was refused; the message is what the user sees.
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// No `-p` and no `SHOPFRONT_PASSWORD`.
    #[error("Password required: pass -p or set SHOPFRONT_PASSWORD")]
    MissingPassword,

    /// No product with this id in the catalog.
    #[error("No product with id {0}")]
    UnknownProduct(shopfront_core::ProductId),

    /// Writing to stdout failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Log the failure, sending server and transport failures to Sentry.
    pub fn report(&self) {
        match self {
            Self::Storefront(e) => e.capture(),
            Self::Auth(e) => tracing::error!(cause = %e.source, "{}", e.message),
            _ => tracing::error!("Command failed: {self}"),
        }
    }
}
