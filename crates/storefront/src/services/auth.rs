//! Authentication state machine.
//!
//! ```text
//! Anonymous --login--> Authenticating --ok--> Authenticated
//!     ^                      |                      |
//!     +--------fail----------+                      |
//!     +-------------------logout--------------------+
//! ```
//!
//! Logout is local: tokens and cached data are dropped without telling the
//! server. Signup never changes state; the user logs in afterwards.

use secrecy::SecretString;
use thiserror::Error;
use tracing::instrument;

use shopfront_core::Email;

use crate::api::{Credentials, SignupRequest};
use crate::error::{StorefrontError, clear_sentry_user, set_sentry_user};
use crate::session::Session;
use crate::state::Storefront;

const LOGIN_FAILED: &str = "Login failed";
const SIGNUP_FAILED: &str = "Signup failed";
const SIGNUP_SUCCEEDED: &str = "Signup successful! Please login.";

/// Where the viewer stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    /// A login request is in flight.
    Authenticating,
    /// Signed in. The username is unknown when the session was restored from
    /// storage and the profile has not been fetched.
    Authenticated { username: Option<String> },
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }
}

/// A failed login or signup: the inline message to show, plus the cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub message: String,
    #[source]
    pub source: StorefrontError,
}

impl AuthFailure {
    fn new(source: StorefrontError, fallback: &str) -> Self {
        let message = match &source {
            StorefrontError::Api(e) => e.server_message().unwrap_or(fallback).to_string(),
            StorefrontError::Email(e) => e.to_string(),
            _ => fallback.to_string(),
        };
        Self { message, source }
    }
}

/// Drives login, logout and signup against one [`Storefront`].
#[derive(Debug)]
pub struct AuthFlow {
    storefront: Storefront,
    state: AuthState,
}

impl AuthFlow {
    /// Start from whatever session the store holds.
    #[must_use]
    pub fn new(storefront: &Storefront) -> Self {
        let state = if storefront.session().is_authenticated() {
            AuthState::Authenticated { username: None }
        } else {
            AuthState::Anonymous
        };
        Self {
            storefront: storefront.clone(),
            state,
        }
    }

    #[must_use]
    pub const fn state(&self) -> &AuthState {
        &self.state
    }

    /// Exchange credentials for tokens and sign in.
    ///
    /// Any existing session is signed out first, so a failed attempt never
    /// leaves the previous user's tokens behind. Both new tokens are
    /// validated and persisted before the state changes. Every cached read
    /// is dropped so the next view sees this user's data.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] carrying the server's `detail` (or
    /// "Login failed") and reverts to `Anonymous`.
    #[instrument(skip_all, fields(username = %credentials.username))]
    pub async fn login(&mut self, credentials: &Credentials) -> Result<&AuthState, AuthFailure> {
        if self.storefront.session().is_authenticated() {
            self.clear_session().await;
        }
        self.state = AuthState::Authenticating;

        match self.sign_in(credentials).await {
            Ok(username) => {
                set_sentry_user(&username);
                tracing::info!("Login successful");
                self.state = AuthState::Authenticated {
                    username: Some(username),
                };
                Ok(&self.state)
            }
            Err(e) => {
                self.state = AuthState::Anonymous;
                let failure = AuthFailure::new(e, LOGIN_FAILED);
                tracing::warn!(error = %failure.source, "Login failed");
                Err(failure)
            }
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<String, StorefrontError> {
        let tokens = self.storefront.api().obtain_token(credentials).await?;
        let session = Session::from_tokens(&tokens.access, &tokens.refresh)?;

        self.storefront.session().sign_in(session.clone())?;
        self.storefront.cache().invalidate_all().await;

        let username = match self.storefront.profile(&session).await {
            Ok(profile) => profile.username,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch profile after login");
                credentials.username.clone()
            }
        };
        Ok(username)
    }

    /// Sign out locally. No request is made.
    pub async fn logout(&mut self) -> &AuthState {
        self.clear_session().await;
        self.state = AuthState::Anonymous;
        &self.state
    }

    async fn clear_session(&self) {
        if let Err(e) = self.storefront.session().sign_out() {
            tracing::warn!(error = %e, "Failed to remove stored session");
        }
        self.storefront.cache().invalidate_all().await;
        clear_sentry_user();
    }

    /// Register a new account. The auth state is unchanged either way.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] with the local email error, the server's
    /// message, or "Signup failed".
    #[instrument(skip(self, email, password))]
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<&'static str, AuthFailure> {
        let email = Email::parse(email)
            .map_err(|e| AuthFailure::new(StorefrontError::from(e), SIGNUP_FAILED))?;

        let form = SignupRequest {
            username: username.to_string(),
            email,
            password: SecretString::from(password.to_string()),
        };

        match self.storefront.api().signup(&form).await {
            Ok(()) => {
                tracing::info!("Signup successful");
                Ok(SIGNUP_SUCCEEDED)
            }
            Err(e) => {
                let failure = AuthFailure::new(e.into(), SIGNUP_FAILED);
                tracing::warn!(error = %failure.source, "Signup failed");
                Err(failure)
            }
        }
    }
}
