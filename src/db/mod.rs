//! PostgreSQL pool construction, migrations, and the readiness probe query
//!
//! One pool is built at startup and shared through `AppState`. Sizing
//! beyond `max_connections` uses fixed tuning below; connections are
//! validated before being handed out so a dropped backend surfaces as a
//! reconnect, not a failed query.

use anyhow::Result;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

const MIN_CONNECTIONS: u32 = 2;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// Create the PostgreSQL connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let connect_options = PgConnectOptions::from_str(database_url)?
        .application_name("auth-service");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(MIN_CONNECTIONS.min(max_connections))
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .idle_timeout(IDLE_TIMEOUT)
        .max_lifetime(MAX_LIFETIME)
        .test_before_acquire(true)
        .connect_with(connect_options)
        .await?;

    info!(max = max_connections, "Database pool created");

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed successfully");
    Ok(())
}

/// Round-trip query used by the readiness probe
pub async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            e.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_pool_rejects_bad_url() {
        // Fails at URL parse, before any connection attempt
        let result = create_pool("not-a-postgres-url", 5).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_min_connections_capped_by_max() {
        // A tiny pool must not demand more idle connections than it may open
        assert_eq!(MIN_CONNECTIONS.min(1), 1);
        assert_eq!(MIN_CONNECTIONS.min(10), MIN_CONNECTIONS);
    }
}
