//! REST client for the storefront API.
//!
//! # Architecture
//!
//! - One configured `reqwest::Client` holding the base URL
//! - Authorization is per call: every method that may be authenticated takes
//!   the caller's [`Session`] explicitly and attaches `Authorization: Bearer`
//! - No retries, no backoff: a failed call is reported once and the caller
//!   decides whether to keep stale data
//!
//! Reads are not cached here; see [`crate::cache`].

mod types;

pub use types::*;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use shopfront_core::{Cart, CartItem, CartItemId, Product, ProductDraft, ProductId};

use crate::config::StorefrontConfig;
use crate::session::Session;

/// How much of an unexpected response body to keep in errors and logs.
const BODY_SNIPPET_CHARS: usize = 200;

/// Errors that can occur when calling the storefront API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 401 or 403.
    #[error("Unauthorized{}", detail(.0))]
    Unauthorized(Option<String>),

    /// 404.
    #[error("Not found{}", detail(.0))]
    NotFound(Option<String>),

    /// 429, with the server's `Retry-After` in seconds.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("API error {status}{}", detail(.message))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// A success response whose body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// The human-readable message the server attached to a failure, if any.
    ///
    /// Login and signup show this inline in place of a generic message.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) | Self::NotFound(message) | Self::Api { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// True for 401/403 responses.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map_or_else(String::new, |m| format!(": {m}"))
}

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: builder.build()?,
                base_url: config.api_url.clone(),
            }),
        })
    }

    /// The base URL every endpoint is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` carrying the server's `detail` when
    /// the credentials are rejected.
    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    pub async fn obtain_token(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let request = self
            .request(Method::POST, "token/", None)?
            .json(credentials);
        Self::send_json(request).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns the server's rejection (duplicate username, weak password, ...)
    /// as `ApiError::Api` with the server message attached.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn signup(&self, form: &SignupRequest) -> Result<(), ApiError> {
        let request = self.request(Method::POST, "signup/", None)?.json(form);
        Self::send_empty(request).await
    }

    /// Fetch the caller's profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the session is rejected.
    #[instrument(skip_all)]
    pub async fn profile(&self, session: &Session) -> Result<Profile, ApiError> {
        let request = self.request(Method::GET, "profile/", Some(session))?;
        Self::send_json(request).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// List every product. Authentication is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip_all, fields(authenticated = session.is_some()))]
    pub async fn list_products(&self, session: Option<&Session>) -> Result<Vec<Product>, ApiError> {
        let request = self.request(Method::GET, "products/", session)?;
        let products: Option<Vec<Product>> = Self::send_json(request).await?;
        Ok(products.unwrap_or_default())
    }

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the draft.
    #[instrument(skip(self, session, draft), fields(name = %draft.name))]
    pub async fn create_product(
        &self,
        session: &Session,
        draft: &ProductDraft,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "products/", Some(session))?
            .json(draft);
        Self::send_empty(request).await
    }

    /// Replace a product's fields (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects the draft.
    #[instrument(skip(self, session, draft), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        session: &Session,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("products/{id}/"), Some(session))?
            .json(draft);
        Self::send_empty(request).await
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session), fields(product_id = %id))]
    pub async fn delete_product(&self, session: &Session, id: ProductId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("products/{id}/"), Some(session))?;
        Self::send_empty(request).await
    }

    // =========================================================================
    // Cart (not cached here - mutable state)
    // =========================================================================

    /// Fetch the caller's cart line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a cart.
    #[instrument(skip_all)]
    pub async fn cart(&self, session: &Session) -> Result<Cart, ApiError> {
        let request = self.request(Method::GET, "cart/", Some(session))?;
        Self::send_json(request).await
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        session: &Session,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "cart/add/", Some(session))?
            .json(&AddToCart {
                product_id,
                quantity,
            });
        Self::send_empty(request).await
    }

    /// Set a line item's quantity, returning the server's updated line item.
    ///
    /// Callers validate `quantity` first; this method sends whatever it is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a line item.
    #[instrument(skip(self, session), fields(item_id = %id))]
    pub async fn update_cart_item(
        &self,
        session: &Session,
        id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("cart/item/{id}/"), Some(session))?
            .json(&QuantityUpdate { quantity });
        Self::send_json(request).await
    }

    /// Remove a line item from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, session), fields(item_id = %id))]
    pub async fn remove_cart_item(&self, session: &Session, id: CartItemId) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, &format!("cart/item/{id}/"), Some(session))?;
        Self::send_empty(request).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    /// Build a request for `path` (relative to the base URL), attaching the
    /// bearer token when a session is given.
    fn request(
        &self,
        method: Method,
        path: &str,
        session: Option<&Session>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let request = self.inner.client.request(method, url);
        Ok(match session {
            Some(session) => request.bearer_auth(session.access_token()),
            None => request,
        })
    }

    /// Send a request and decode a JSON body.
    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(Self::parse_error(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&body),
                "Failed to parse storefront API response"
            );
            ApiError::Parse(e.to_string())
        })
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(request: RequestBuilder) -> Result<(), ApiError> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }

    /// Map a non-success response onto an [`ApiError`].
    async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(1);
            return ApiError::RateLimited(retry_after);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(&body);

        tracing::debug!(
            status = %status,
            body = %snippet(&body),
            "Storefront API returned non-success status"
        );

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            _ => ApiError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Pull a human-readable message out of an error body.
///
/// Prefers a top-level `detail` or `message` string, then flattens
/// field-level validation errors (`{"username": ["already taken"]}`), then
/// falls back to a snippet of the raw body.
fn server_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) else {
        return Some(snippet(trimmed));
    };

    let Some(object) = value.as_object() else {
        return value.as_str().map(str::to_owned);
    };

    for key in ["detail", "message", "error"] {
        if let Some(text) = object.get(key).and_then(serde_json::Value::as_str) {
            return Some(text.to_owned());
        }
    }

    let fields: Vec<String> = object
        .iter()
        .filter_map(|(field, errors)| {
            let text = match errors {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();

    if fields.is_empty() {
        Some(snippet(trimmed))
    } else {
        Some(fields.join("; "))
    }
}

fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}
