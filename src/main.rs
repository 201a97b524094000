//! Auth Service
//!
//! Issues, validates, rotates, and revokes authentication credentials
//! for API clients.
//!
//! ## Architecture
//!
//! The service follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: session issuance, rotation, revocation
//! - Repositories: users and the refresh token ledger
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use auth_service::{config, db, repositories::RefreshTokenRepository, routes, state::AppState};
use std::time::Duration;
use tokio::signal;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    // Load configuration
    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Auth Service"
    );

    // Validate production configuration
    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    // Create database pool
    info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database.url, config.database.max_connections).await?;

    // Run migrations (skip in production if using separate migration job)
    if !config::AppConfig::is_production() {
        info!("Running database migrations...");
        db::run_migrations(&db_pool).await?;
    }

    // Create application state
    let state = AppState::new(db_pool.clone(), config.clone());

    // Periodically reclaim expired refresh tokens. Expiry is enforced at
    // consumption time; this only keeps the ledger small.
    tokio::spawn(sweep_expired_tokens(db_pool));

    // Build application
    let app = routes::create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Serve with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Background sweep of expired refresh token rows
async fn sweep_expired_tokens(pool: sqlx::PgPool) {
    let mut interval = tokio::time::interval(Duration::from_secs(3600));
    loop {
        interval.tick().await;
        match RefreshTokenRepository::delete_expired(&pool).await {
            Ok(0) => {}
            Ok(n) => debug!(reclaimed = n, "Swept expired refresh tokens"),
            Err(e) => warn!("Expired token sweep failed: {}", e),
        }
    }
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "auth_service=info,tower_http=info".into()
        } else {
            "auth_service=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        // Pretty logging for development
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Validate configuration for production deployment
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let mut errors = Vec::new();

    for (name, secret) in [
        ("access", &config.jwt.access_secret),
        ("refresh", &config.jwt.refresh_secret),
    ] {
        if secret.contains("development") || secret.len() < 32 {
            error!("JWT {} secret must be at least 32 characters and not contain 'development'", name);
            errors.push("weak JWT secret");
        }
    }

    // Cross-purpose separation relies on the keys being distinct
    if config.jwt.access_secret == config.jwt.refresh_secret {
        errors.push("access and refresh secrets must differ");
    }

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
