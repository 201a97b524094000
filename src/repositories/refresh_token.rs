//! Refresh token ledger
//!
//! Persisted record of issued refresh tokens. A token is consumed by
//! deleting its row, so absence means invalid: consumed, logged out, and
//! never-issued tokens all look the same. Expiry is checked lazily at
//! consumption time; a background sweep reclaims expired rows.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Refresh token record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Refresh token repository for database operations
pub struct RefreshTokenRepository;

impl RefreshTokenRepository {
    /// Record a newly issued refresh token
    pub async fn record(
        pool: &PgPool,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Atomically consume an active refresh token
    ///
    /// Deletes the row only if it exists and has not expired, returning it.
    /// The single compare-and-delete statement is what makes rotation safe
    /// under concurrency: of N simultaneous attempts on the same token
    /// value, exactly one gets `Some` and the rest observe `None`. A
    /// present-but-expired row also yields `None`.
    pub async fn consume_active(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1 AND expires_at > NOW()
            RETURNING token, user_id, expires_at
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(record)
    }

    /// Delete a refresh token unconditionally (logout)
    ///
    /// Idempotent: deleting an absent token is not an error.
    pub async fn delete(pool: &PgPool, token: &str) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Reclaim expired rows, returning how many were removed
    ///
    /// Correctness does not depend on this — expiry is enforced at
    /// consumption time — it only keeps the table small.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE expires_at <= NOW()
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    // Covered by integration tests in tests/ (require a database),
    // including the concurrent-consumption race.
}
