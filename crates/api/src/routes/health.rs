//! Health and probe endpoints.
//!
//! `/api/health` reports database reachability with latency for
//! dashboards; `/api/health/ready` and `/api/health/live` are the
//! orchestrator probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;
use std::time::Instant;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DbStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DbStatus {
    pub reachable: bool,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProbeResponse {
    pub status: &'static str,
}

/// Round-trips a trivial query, returning the latency when it succeeds.
async fn ping_database(pool: &PgPool) -> Option<u64> {
    let started = Instant::now();
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .ok()
        .map(|_| started.elapsed().as_millis() as u64)
}

/// GET /api/health
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let latency_ms = ping_database(&state.pool).await;
    let reachable = latency_ms.is_some();

    let response = HealthResponse {
        status: if reachable { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DbStatus {
            reachable,
            latency_ms,
        },
    };

    if reachable {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// GET /api/health/live. The process is up.
pub async fn live() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "alive" })
}

/// GET /api/health/ready. The service can reach its database.
pub async fn ready(State(state): State<AppState>) -> Result<Json<ProbeResponse>, StatusCode> {
    if ping_database(&state.pool).await.is_some() {
        Ok(Json(ProbeResponse { status: "ready" }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serializes_latency() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.3.0",
            database: DbStatus {
                reachable: true,
                latency_ms: Some(4),
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["database"]["latency_ms"], 4);
        assert_eq!(json["status"], "healthy");
    }

    #[test]
    fn test_unreachable_database_has_no_latency() {
        let status = DbStatus {
            reachable: false,
            latency_ms: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json["latency_ms"].is_null());
    }
}
