//! Health, liveness and readiness endpoints

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use super::state::AppState;
use crate::api::types::Json;
use crate::domain::ProviderRegistry;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Per-provider readiness
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Returns 200 while the process is running
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
    };

    (StatusCode::OK, Json(response))
}

/// Ready when at least one provider can be called
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let checks = provider_checks(state.registry());
    let overall_status = overall_status(&checks);

    let status_code = match overall_status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let response = HealthResponse {
        status: overall_status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
    };

    (status_code, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

fn provider_checks(registry: &ProviderRegistry) -> Vec<HealthCheck> {
    registry
        .profiles()
        .map(|profile| {
            if profile.has_secret() {
                HealthCheck {
                    name: profile.id().to_string(),
                    status: HealthStatus::Healthy,
                    message: None,
                }
            } else {
                HealthCheck {
                    name: profile.id().to_string(),
                    status: HealthStatus::Unhealthy,
                    message: Some(format!("{} is not set", profile.id().secret_env())),
                }
            }
        })
        .collect()
}

fn overall_status(checks: &[HealthCheck]) -> HealthStatus {
    let healthy = checks
        .iter()
        .filter(|c| c.status == HealthStatus::Healthy)
        .count();

    match healthy {
        0 => HealthStatus::Unhealthy,
        n if n == checks.len() => HealthStatus::Healthy,
        _ => HealthStatus::Degraded,
    }
}
