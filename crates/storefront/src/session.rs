//! Session credentials and their persistence.
//!
//! A [`Session`] is the access/refresh token pair issued by `POST /token/`.
//! Both tokens are present or the session does not exist at all: the
//! half-signed-in state is unrepresentable because everything holds an
//! `Option<Session>`.
//!
//! Views never look the session up from ambient storage. They receive a
//! [`SessionHandle`], read it per call, and only the auth flow writes it.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT segments are unpadded base64url, but tolerate padding if a server adds it.
const JWT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors that can occur when reading, writing or validating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A token returned by the server is not a well-formed JWT.
    #[error("malformed {which} token: {reason}")]
    MalformedToken {
        which: &'static str,
        reason: String,
    },

    /// The session file could not be read or written.
    #[error("session storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The session file exists but is not a valid token pair.
    #[error("session file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// An authenticated session: the access and refresh tokens.
#[derive(Clone)]
pub struct Session {
    access: SecretString,
    refresh: SecretString,
}

impl Session {
    /// Build a session from a freshly issued token pair.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::MalformedToken`] unless both tokens have the
    /// shape of a JWT: three non-empty base64url segments whose first
    /// segment decodes to a JSON object.
    pub fn from_tokens(access: &str, refresh: &str) -> Result<Self, SessionError> {
        validate_jwt_shape(access).map_err(|reason| SessionError::MalformedToken {
            which: "access",
            reason,
        })?;
        validate_jwt_shape(refresh).map_err(|reason| SessionError::MalformedToken {
            which: "refresh",
            reason,
        })?;

        Ok(Self {
            access: SecretString::from(access.to_owned()),
            refresh: SecretString::from(refresh.to_owned()),
        })
    }

    /// The bearer token attached to authenticated requests.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access.expose_secret()
    }

    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh.expose_secret()
    }

    /// Expiry of the access token, from its `exp` claim if it carries one.
    #[must_use]
    pub fn access_expiry(&self) -> Option<DateTime<Utc>> {
        let payload = self.access_token().split('.').nth(1)?;
        let bytes = JWT_ENGINE.decode(payload).ok()?;
        let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
        let exp = claims.get("exp")?.as_i64()?;
        DateTime::from_timestamp(exp, 0)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access", &"[REDACTED]")
            .field("refresh", &"[REDACTED]")
            .finish()
    }
}

fn validate_jwt_shape(token: &str) -> Result<(), String> {
    let segments: Vec<&str> = token.split('.').collect();
    let [header, payload, signature] = segments.as_slice() else {
        return Err(format!("expected 3 segments, found {}", segments.len()));
    };

    let decode = |name: &str, segment: &str| {
        if segment.is_empty() {
            return Err(format!("{name} segment is empty"));
        }
        JWT_ENGINE
            .decode(segment)
            .map_err(|e| format!("{name} segment is not base64url: {e}"))
    };

    let header = decode("header", *header)?;
    decode("payload", *payload)?;
    decode("signature", *signature)?;

    match serde_json::from_slice::<serde_json::Value>(&header) {
        Ok(value) if value.is_object() => Ok(()),
        _ => Err("header is not a JSON object".to_string()),
    }
}

// =============================================================================
// Storage
// =============================================================================

/// Persistent storage for the token pair.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, `None` when signed out.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage is unreadable or corrupt.
    fn load(&self) -> Result<Option<Session>, SessionError>;

    /// Persist both tokens, replacing any previous session.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, session: &Session) -> Result<(), SessionError>;

    /// Remove both tokens. Clearing an empty store is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be modified.
    fn clear(&self) -> Result<(), SessionError>;
}

/// On-disk layout of the session file.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    access: String,
    refresh: String,
    saved_at: DateTime<Utc>,
}

/// Session store backed by a JSON file under fixed `access`/`refresh` keys.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let stored: StoredSession =
            serde_json::from_slice(&bytes).map_err(|source| SessionError::Corrupt {
                path: self.path.clone(),
                source,
            })?;

        Ok(Some(Session {
            access: SecretString::from(stored.access),
            refresh: SecretString::from(stored.refresh),
        }))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let stored = StoredSession {
            access: session.access_token().to_owned(),
            refresh: session.refresh_token().to_owned(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(|source| SessionError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| self.io_error(e))?;
        file.write_all(&json).map_err(|e| self.io_error(e))
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process session store, for tests and embedders with their own storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// =============================================================================
// SessionHandle
// =============================================================================

/// The explicitly passed session context.
///
/// Holds the store and an in-memory copy of the current session. Reads are
/// cheap clones; writes go through to the store first so memory never
/// claims a session the store failed to persist.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionHandleInner>,
}

struct SessionHandleInner {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionHandle {
    /// Open a handle, reading whatever session the store holds.
    ///
    /// A corrupt store is logged and cleared; the handle then starts
    /// signed out.
    pub fn open(store: impl SessionStore + 'static) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session");
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "Failed to clear unreadable session");
                }
                None
            }
        };

        Self {
            inner: Arc::new(SessionHandleInner {
                store: Box::new(store),
                current: RwLock::new(current),
            }),
        }
    }

    /// The current session, if signed in.
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Persist and adopt a new session.
    pub(crate) fn sign_in(&self, session: Session) -> Result<(), SessionError> {
        self.inner.store.save(&session)?;
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Forget the session in memory and in the store.
    ///
    /// Memory is cleared even if the store fails, so a failed delete never
    /// leaves the handle signed in.
    pub(crate) fn sign_out(&self) -> Result<(), SessionError> {
        *self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        self.inner.store.clear()
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::test_tokens::jwt;
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("shopfront-session-{}-{name}", std::process::id()))
            .join("session.json")
    }

    #[test]
    fn test_from_tokens_accepts_jwts() {
        let session = Session::from_tokens(&jwt("a", 1_700_000_000), &jwt("a", 1_800_000_000))
            .unwrap();
        assert_eq!(
            session.access_expiry().unwrap().timestamp(),
            1_700_000_000
        );
    }

    #[test]
    fn test_from_tokens_rejects_malformed() {
        let good = jwt("a", 1);
        let err = Session::from_tokens("not-a-token", &good).unwrap_err();
        assert!(matches!(
            err,
            SessionError::MalformedToken { which: "access", .. }
        ));

        let err = Session::from_tokens(&good, "a..c").unwrap_err();
        assert!(matches!(
            err,
            SessionError::MalformedToken { which: "refresh", .. }
        ));

        // Three segments, but the header is not JSON.
        let fake = "aGVsbG8.d29ybGQ.c2ln";
        assert!(Session::from_tokens(fake, &good).is_err());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let token = jwt("secret-subject", 1);
        let session = Session::from_tokens(&token, &token).unwrap();
        let debug = format!("{session:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains(&token));
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let path = temp_path("roundtrip");
        let store = FileSessionStore::new(&path);
        assert!(store.load().unwrap().is_none());

        let session = Session::from_tokens(&jwt("a", 1), &jwt("a", 2)).unwrap();
        store.save(&session).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["access"], session.access_token());
        assert_eq!(raw["refresh"], session.refresh_token());

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token(), session.access_token());

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_half_present_is_corrupt() {
        let path = temp_path("half");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, br#"{"access":"x"}"#).unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.load(), Err(SessionError::Corrupt { .. })));

        // Opening a handle over it discards the file and starts signed out.
        let handle = SessionHandle::open(store.clone());
        assert!(!handle.is_authenticated());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_handle_sign_in_and_out() {
        let handle = SessionHandle::open(MemorySessionStore::new());
        assert!(handle.current().is_none());

        let session = Session::from_tokens(&jwt("a", 1), &jwt("a", 2)).unwrap();
        handle.sign_in(session).unwrap();
        assert!(handle.is_authenticated());

        handle.sign_out().unwrap();
        assert!(!handle.is_authenticated());
    }
}
