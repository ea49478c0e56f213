//! Bearer-token sessions held in memory.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use dbcsv_core::protocol::{TokenClaims, TokenResponse, TOKEN_TYPE_BEARER};
use tracing::{debug, info};

use crate::error::{AuthError, Result};

/// An issued, still known session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Random key (64 character hex string).
    pub session_key: String,
    pub username: String,
    pub expire_date: DateTime<Utc>,
}

impl Session {
    fn for_user(username: &str, ttl: Duration) -> Self {
        Self {
            session_key: generate_session_key(),
            username: username.to_string(),
            expire_date: Utc::now() + ttl,
        }
    }

    /// Returns whether this session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expire_date
    }

    /// Returns the bearer token for this session.
    #[must_use]
    pub fn token(&self) -> String {
        TokenClaims::encode(&self.session_key, self.expire_date)
    }
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expiry: issued.expires_at.timestamp(),
        }
    }
}

/// Issues and validates bearer tokens.
///
/// The server is the sole authority on validity: a token is valid only
/// while its key is present here and unexpired.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Default token lifetime in minutes.
    pub const DEFAULT_EXPIRY_MINUTES: i64 = 30;

    /// Creates an empty store issuing tokens valid for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a new token for `username`, dropping expired sessions first.
    pub fn issue(&self, username: &str) -> IssuedToken {
        self.clear_expired();

        let session = Session::for_user(username, self.ttl);
        let issued = IssuedToken {
            token: session.token(),
            expires_at: session.expire_date,
        };
        info!(%username, expires_at = %session.expire_date, "Issued token");

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session.session_key.clone(), session);
        issued
    }

    /// Resolves a bearer token to its session.
    pub fn verify(&self, token: &str) -> Result<Session> {
        let key = session_key(token)?;
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.get(key).ok_or(AuthError::SessionNotFound)?;

        if session.token() != token {
            return Err(AuthError::SessionNotFound);
        }
        if session.is_expired() {
            return Err(AuthError::SessionExpired);
        }
        Ok(session.clone())
    }

    /// Exchanges a valid token for a new one and revokes the old one.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken> {
        let session = self.verify(token)?;
        self.revoke(token);
        debug!(username = %session.username, "Refreshing token");
        Ok(self.issue(&session.username))
    }

    /// Forgets a token. Returns true if it was known.
    pub fn revoke(&self, token: &str) -> bool {
        let Ok(key) = session_key(token) else {
            return false;
        };
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Deletes all expired sessions. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Cleared expired sessions");
        }
        removed
    }

    /// Returns the count of known sessions, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true if no session is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(Self::DEFAULT_EXPIRY_MINUTES))
    }
}

fn session_key(token: &str) -> Result<&str> {
    TokenClaims::decode(token).ok_or(AuthError::SessionNotFound)?;
    token
        .split_once('.')
        .map(|(key, _)| key)
        .ok_or(AuthError::SessionNotFound)
}

/// Generates a cryptographically secure session key.
fn generate_session_key() -> String {
    use rand::RngExt;
    let mut rng = rand::rng();
    let mut bytes = [0u8; 32];
    rng.fill(&mut bytes);
    hex::encode(&bytes)
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_key_generation() {
        let key1 = generate_session_key();
        let key2 = generate_session_key();

        assert_eq!(key1.len(), 64);
        assert!(key1.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_issue_and_verify() {
        let store = SessionStore::default();
        let issued = store.issue("johndoe");

        let claims = TokenClaims::decode(&issued.token).unwrap();
        assert_eq!(claims.expires_at.timestamp(), issued.expires_at.timestamp());
        assert_eq!(store.verify(&issued.token).unwrap().username, "johndoe");
    }

    #[test]
    fn test_unknown_and_tampered_tokens() {
        let store = SessionStore::default();
        let issued = store.issue("johndoe");

        assert!(matches!(store.verify("garbage"), Err(AuthError::SessionNotFound)));

        let (key, _) = issued.token.split_once('.').unwrap();
        let tampered = format!("{key}.9999999999");
        assert!(matches!(store.verify(&tampered), Err(AuthError::SessionNotFound)));
    }

    #[test]
    fn test_expired_token() {
        let store = SessionStore::new(Duration::seconds(-1));
        let issued = store.issue("johndoe");
        assert!(matches!(
            store.verify(&issued.token),
            Err(AuthError::SessionExpired)
        ));
        assert!(store.refresh(&issued.token).is_err());
    }

    #[test]
    fn test_refresh_revokes_old_token() {
        let store = SessionStore::default();
        let old = store.issue("johndoe");
        let new = store.refresh(&old.token).unwrap();

        assert_ne!(old.token, new.token);
        assert!(store.verify(&old.token).is_err());
        assert_eq!(store.verify(&new.token).unwrap().username, "johndoe");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_issue_sweeps_expired() {
        let expired = SessionStore::new(Duration::seconds(-1));
        expired.issue("a");
        expired.issue("b");
        // Each issue sweeps the previously issued, already expired token.
        assert_eq!(expired.len(), 1);
        assert_eq!(expired.clear_expired(), 1);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_token_response() {
        let store = SessionStore::default();
        let issued = store.issue("johndoe");
        let response = TokenResponse::from(issued.clone());
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.access_token, issued.token);
        assert_eq!(response.expiry, issued.expires_at.timestamp());
    }
}
