//! Navigation bar summary.

use tracing::instrument;

use crate::state::Storefront;

/// What the navigation bar shows: who is signed in and how many line items
/// are in their cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavSummary {
    pub username: Option<String>,
    pub cart_count: usize,
}

impl NavSummary {
    /// Read the summary through the shared cache.
    ///
    /// Never fails: a missing session gives the anonymous summary, and fetch
    /// failures are logged and leave the affected field empty.
    #[instrument(skip_all)]
    pub async fn load(storefront: &Storefront) -> Self {
        let Some(session) = storefront.session().current() else {
            return Self::default();
        };

        let username = match storefront.profile(&session).await {
            Ok(profile) => Some(profile.username),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch profile for navigation");
                None
            }
        };

        let cart_count = match storefront.cart(&session).await {
            Ok(cart) => cart.line_count(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch cart for navigation");
                0
            }
        };

        Self {
            username,
            cart_count,
        }
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.username.is_none()
    }
}
