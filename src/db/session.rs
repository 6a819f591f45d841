//! Durable session records.
//!
//! A record is keyed by the issued token string and is the authoritative
//! check for token validity. Expiry is always evaluated against the
//! `expires_at` column, so an expired row that has not been swept yet is
//! indistinguishable from a missing one.

use sqlx::sqlite::SqlitePool;

/// A stored session.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub expires_at: i64,
}

/// Store for session records.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a session record.
    pub async fn create(
        &self,
        id: &str,
        user_id: &str,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get a session that has not expired as of `now`.
    pub async fn get_unexpired(
        &self,
        id: &str,
        now: i64,
    ) -> Result<Option<SessionRecord>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, user_id, expires_at FROM sessions WHERE id = ? AND expires_at >= ?",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    /// Get the username owning a session.
    pub async fn get_username(&self, id: &str) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT users.username FROM users INNER JOIN sessions ON users.id = sessions.user_id WHERE sessions.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Delete all sessions that expired before `now`.
    pub async fn delete_expired(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
