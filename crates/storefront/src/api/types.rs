//! Request and response bodies for the storefront REST API.
//!
//! Domain types shared with the rest of the workspace (products, cart line
//! items) live in `shopfront_core`; this module only holds the wire shapes
//! that exist purely to talk to the server.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use shopfront_core::{Email, ProductId};

/// Username/password pair posted to `POST /token/`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Token pair returned by `POST /token/`.
#[derive(Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair").finish_non_exhaustive()
    }
}

/// Registration fields posted to `POST /signup/`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: Email,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

/// The caller's profile from `GET /profile/`. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_superuser: bool,
}

/// Body of `POST /cart/add/`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AddToCart {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `PATCH /cart/item/{id}/`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Option::<bool>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_serialize_password_but_debug_hides_it() {
        let creds = Credentials::new("ana", "hunter22");
        let json = serde_json::to_value(&creds).unwrap();
        assert_eq!(json["username"], "ana");
        assert_eq!(json["password"], "hunter22");
        assert!(!format!("{creds:?}").contains("hunter22"));
    }

    #[test]
    fn test_profile_defaults_superuser_flag() {
        let profile: Profile =
            serde_json::from_str(r#"{"username":"ana","email":"a@b.c"}"#).unwrap();
        assert!(!profile.is_superuser);
    }

    #[test]
    fn test_profile_accepts_null_superuser_flag() {
        let profile: Profile =
            serde_json::from_str(r#"{"username":"ana","is_superuser":null}"#).unwrap();
        assert_eq!(profile.username, "ana");
        assert!(!profile.is_superuser);

        let profile: Profile =
            serde_json::from_str(r#"{"username":"root","is_superuser":true}"#).unwrap();
        assert!(profile.is_superuser);
    }
}
