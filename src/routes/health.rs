//! Liveness and readiness probes
//!
//! The service is "live" whenever it can answer HTTP, and "ready" only
//! when the database answers a round-trip. Orchestrators can then restart
//! a hung process without draining traffic from one that is merely
//! waiting on Postgres. `/health` is the plain uptime-check variant of
//! the two.

use crate::{db, state::AppState};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Probe response body
#[derive(Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Database check result, present only on the readiness probe
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,
}

impl ProbeResponse {
    fn new(status: &'static str) -> Self {
        Self {
            status,
            version: env!("CARGO_PKG_VERSION"),
            database: None,
        }
    }
}

/// GET /health — plain uptime check
pub async fn health_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("healthy"))
}

/// GET /health/ready — 503 until the database answers
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ProbeResponse>, (StatusCode, Json<ProbeResponse>)> {
    match db::health_check(&state.db).await {
        Ok(()) => Ok(Json(ProbeResponse {
            database: Some("up"),
            ..ProbeResponse::new("ready")
        })),
        Err(_) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                database: Some("down"),
                ..ProbeResponse::new("not_ready")
            }),
        )),
    }
}

/// GET /health/live — OK as long as the process serves requests
pub async fn liveness_check() -> Json<ProbeResponse> {
    Json(ProbeResponse::new("alive"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_healthy_with_version() {
        let response = health_check().await;
        assert_eq!(response.status, "healthy");
        assert!(!response.version.is_empty());
        assert!(response.database.is_none());
    }

    #[tokio::test]
    async fn test_liveness_never_consults_dependencies() {
        // No state parameter at all: liveness cannot block on the database
        let response = liveness_check().await;
        assert_eq!(response.status, "alive");
    }
}
