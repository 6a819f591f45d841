//! Authentication user types.

use serde::Serialize;

use crate::db::{SessionRecord, User};

/// A verified user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// User ID (UUID)
    pub user_id: String,
    pub username: String,
}

impl From<User> for Identity {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            username: user.username,
        }
    }
}

/// A live session, attached to the request by the gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Session ID (the issued token string)
    pub id: String,
    pub user_id: String,
    /// Expiration time (Unix timestamp)
    pub expires_at: i64,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            expires_at: record.expires_at,
        }
    }
}
