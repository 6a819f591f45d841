//! Session lifecycle: issue, validate, resolve and sweep.
//!
//! Every session is a signed token plus a durable record keyed by that
//! token string. The record is authoritative: a token is only honoured
//! while its record exists and has not expired.

use std::sync::Arc;

use tracing::debug;

use super::errors::AuthError;
use super::types::{Identity, Session};
use crate::db::{Database, SessionStore};
use crate::jwt::{JwtConfig, unix_now};

/// Creates and checks sessions against the database.
#[derive(Clone)]
pub struct SessionManager {
    store: SessionStore,
    jwt: Arc<JwtConfig>,
}

impl SessionManager {
    pub fn new(db: &Database, jwt: Arc<JwtConfig>) -> Self {
        Self {
            store: db.sessions(),
            jwt,
        }
    }

    pub fn jwt(&self) -> &JwtConfig {
        &self.jwt
    }

    /// Issue a token for `identity` and persist its session record.
    /// The token is only handed out once the insert has succeeded.
    pub async fn create(&self, identity: &Identity) -> Result<Session, AuthError> {
        let issued = self.jwt.issue(&identity.user_id, &identity.username)?;
        let expires_at = to_epoch(issued.expires_at)?;

        self.store
            .create(&issued.token, &identity.user_id, expires_at)
            .await?;

        debug!(user_id = %identity.user_id, expires_at, "Session created");

        Ok(Session {
            id: issued.token,
            user_id: identity.user_id.clone(),
            expires_at,
        })
    }

    /// Look up an unexpired session. Missing and expired records both
    /// yield `NotFound`.
    pub async fn validate(&self, token: &str) -> Result<Session, AuthError> {
        let now = current_epoch()?;
        self.store
            .get_unexpired(token, now)
            .await?
            .map(Session::from)
            .ok_or(AuthError::NotFound)
    }

    /// Check a presented bearer token: the signature must verify and a live
    /// record must exist for the same string. Every rejection is
    /// `Unauthorized`; store failures pass through as `StoreUnavailable`.
    pub async fn authenticate(&self, token: &str) -> Result<Session, AuthError> {
        if let Err(e) = self.jwt.decode(token) {
            debug!(error = %e, "Rejected bearer token");
            return Err(AuthError::Unauthorized);
        }

        match self.validate(token).await {
            Err(AuthError::NotFound) => {
                debug!("No live session for bearer token");
                Err(AuthError::Unauthorized)
            }
            other => other,
        }
    }

    /// Resolve the username owning a session, as recorded in the store.
    pub async fn lookup_username_by_session_id(
        &self,
        session_id: &str,
    ) -> Result<String, AuthError> {
        self.store
            .get_username(session_id)
            .await?
            .ok_or(AuthError::NotFound)
    }

    /// Delete every record whose expiry has passed. Returns the number removed.
    pub async fn sweep_expired(&self) -> Result<u64, AuthError> {
        let now = current_epoch()?;
        Ok(self.store.delete_expired(now).await?)
    }
}

fn current_epoch() -> Result<i64, AuthError> {
    to_epoch(unix_now()?)
}

fn to_epoch(secs: u64) -> Result<i64, AuthError> {
    i64::try_from(secs).map_err(|_| AuthError::Internal("Timestamp out of range".into()))
}
