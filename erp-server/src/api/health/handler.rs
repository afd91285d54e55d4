//! Health check handler

use axum::extract::State;
use serde::Serialize;

use crate::core::ServerState;
use crate::utils::{ok, ApiResponse, AppResult};

/// Liveness report with the configured downstream services
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub environment: String,
    /// Whether an email gateway URL is configured
    pub email_gateway_configured: bool,
}

/// GET /api/health
pub async fn health(State(state): State<ServerState>) -> AppResult<ApiResponse<HealthStatus>> {
    Ok(ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        email_gateway_configured: !state.config.email_gateway_url.is_empty(),
    }))
}
