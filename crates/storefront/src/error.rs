//! Unified error handling with Sentry integration.
//!
//! Views return `Result<T, StorefrontError>`. Local validation failures
//! (filters, forms, quantities) stay local; server and transport failures
//! are worth reporting and go through [`StorefrontError::capture`].

use thiserror::Error;

use shopfront_core::{CartError, EmailError, FilterError, ProductFormError};

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Storefront-level error type.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// A call to the REST API failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// The session could not be read, written or validated.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A cart change was rejected locally.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// A filter input did not parse.
    #[error("Invalid filter: {0}")]
    Filter(#[from] FilterError),

    /// The admin product form is incomplete or invalid.
    #[error("Invalid product: {0}")]
    ProductForm(#[from] ProductFormError),

    /// The signup email is malformed.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// The action needs a signed-in user.
    #[error("Please log in first")]
    LoginRequired,

    /// The action needs a superuser profile.
    #[error("Admin access required")]
    NotAdmin,
}

impl StorefrontError {
    /// Whether this failure came from outside the process and is worth
    /// sending to error tracking.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(
                err,
                ApiError::Unauthorized(_) | ApiError::NotFound(_) | ApiError::RateLimited(_)
            ),
            Self::Session(SessionError::Io { .. } | SessionError::MalformedToken { .. }) => true,
            _ => false,
        }
    }

    /// Report to Sentry (if reportable) and log.
    pub fn capture(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(error = %self, sentry_event_id = %event_id, "Storefront error");
        } else {
            tracing::warn!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Set the Sentry user context after a successful login.
pub fn set_sentry_user(username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            username: Some(username.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_errors_are_not_reportable() {
        assert!(!StorefrontError::LoginRequired.is_reportable());
        assert!(!StorefrontError::NotAdmin.is_reportable());
        assert!(!StorefrontError::from(CartError::NonPositiveQuantity(0)).is_reportable());
        assert!(!StorefrontError::from(ApiError::Unauthorized(None)).is_reportable());
    }

    #[test]
    fn test_server_errors_are_reportable() {
        let err = StorefrontError::from(ApiError::Api {
            status: 500,
            message: None,
        });
        assert!(err.is_reportable());
        assert_eq!(err.to_string(), "API error: API error 500");
    }
}
