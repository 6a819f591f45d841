//! Username/password accounts backed by bcrypt hashes.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::errors::AuthError;
use super::types::Identity;
use crate::db::{Database, UserStore, is_unique_violation};

/// Registers and verifies user credentials.
#[derive(Clone)]
pub struct Credentials {
    users: UserStore,
    cost: u32,
    /// Hash compared against when the username is unknown, so both login
    /// failures cost one bcrypt verification
    dummy_hash: Arc<OnceCell<String>>,
}

impl Credentials {
    /// `cost` is the bcrypt work factor (4..=31).
    pub fn new(db: &Database, cost: u32) -> Self {
        Self {
            users: db.users(),
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Create an account. A taken username is detected by the UNIQUE
    /// constraint on insert, so concurrent registrations of the same name
    /// resolve to exactly one winner.
    pub async fn register(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let hash = self.hash_password(password).await?;
        let user_id = uuid::Uuid::new_v4().to_string();

        match self
            .users
            .create(&user_id, username, hash.as_bytes())
            .await
        {
            Ok(()) => {}
            Err(e) if is_unique_violation(&e) => return Err(AuthError::AlreadyExists),
            Err(e) => return Err(AuthError::StoreUnavailable(e)),
        }

        info!(user_id = %user_id, username = %username, "User registered");

        Ok(Identity {
            user_id,
            username: username.to_string(),
        })
    }

    /// Check a username/password pair. An unknown username still pays for a
    /// full hash comparison before `NotFound` is returned.
    pub async fn verify(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(user) = self.users.get_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| self.hash_password("postgate-dummy-password"))
                .await?
                .clone();
            verify_password(password, dummy).await?;
            debug!(username = %username, "Unknown username");
            return Err(AuthError::NotFound);
        };

        let hash = String::from_utf8(user.password_hash.clone())
            .map_err(|_| AuthError::Internal("Stored password hash is not valid UTF-8".into()))?;

        if !verify_password(password, hash).await? {
            debug!(username = %username, "Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(Identity::from(user))
    }

    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

async fn verify_password(password: &str, hash: String) -> Result<bool, AuthError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .map_err(|e| AuthError::Internal(e.to_string()))
}
