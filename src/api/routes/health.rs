//! Health Routes
//!
//! Service status endpoints for monitoring and orchestrators.
//!
//! - GET / - Service banner
//! - GET /api/health - API status with component details
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (data directory reachable)

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{HealthResponse, ServiceStatus};
use crate::api::state::AppState;

/// GET /
pub async fn root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "healthy".to_string(),
        service: "medhere-backend".to_string(),
    })
}

/// GET /api/health
pub async fn api_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage_ok = state.store.is_healthy().await;

    Json(HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        message: if storage_ok {
            "Backend API is running".to_string()
        } else {
            "Backend API is running but storage is unavailable".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        interaction_checker: state.checker.name().to_string(),
        active_sessions: state.sessions.active_sessions().await,
    })
}

/// GET /health/live
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.store.is_healthy().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
