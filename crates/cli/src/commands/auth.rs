//! Session commands.

use std::io;

use shopfront_storefront::api::Credentials;
use shopfront_storefront::{AuthFlow, NavSummary, Storefront};

use super::CliError;
use crate::render;

/// Sign in and persist the session.
pub async fn login(
    storefront: &Storefront,
    username: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password.ok_or(CliError::MissingPassword)?;
    let credentials = Credentials::new(username, password);

    let mut flow = AuthFlow::new(storefront);
    flow.login(&credentials).await?;

    render::line(&mut io::stdout().lock(), "Login successful!")?;
    Ok(())
}

/// Drop the stored session. Nothing is sent to the server.
pub async fn logout(storefront: &Storefront) -> Result<(), CliError> {
    let mut flow = AuthFlow::new(storefront);
    flow.logout().await;
    render::line(&mut io::stdout().lock(), "Logged out.")?;
    Ok(())
}

/// Register a new account.
pub async fn signup(
    storefront: &Storefront,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(), CliError> {
    let flow = AuthFlow::new(storefront);
    let message = flow.signup(username, email, password).await?;
    render::line(&mut io::stdout().lock(), message)?;
    Ok(())
}

/// Print the navigation summary and when the access token expires.
pub async fn whoami(storefront: &Storefront) -> Result<(), CliError> {
    let nav = NavSummary::load(storefront).await;
    let mut out = io::stdout().lock();
    render::nav(&mut out, &nav)?;

    if let Some(expiry) = storefront
        .session()
        .current()
        .and_then(|session| session.access_expiry())
    {
        render::line(&mut out, &format!("Access token expires {}", expiry.to_rfc3339()))?;
    }
    Ok(())
}
