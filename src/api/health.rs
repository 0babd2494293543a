// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Managed store reachability. Only present when one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_store: Option<String>,
    /// Whether requests will fall back to the local store.
    pub local_fallback: bool,
    /// Chain RPC reachability. Only present when chain messaging is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

async fn check_managed_store(state: &AppState) -> Option<String> {
    let store = state.persistence.managed()?;
    Some(match store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Managed store health check failed");
            "unavailable".to_string()
        }
    })
}

async fn check_chain(state: &AppState) -> Option<String> {
    let chain = state.chain.as_ref()?;
    Some(match chain.block_number().await {
        Ok(_) => "ok".to_string(),
        Err(e) => {
            tracing::warn!(error = %e, "Chain RPC health check failed");
            "unavailable".to_string()
        }
    })
}

/// Health check endpoint handler.
///
/// Returns 503 when a configured dependency is unreachable. An unreachable
/// managed store only degrades the service when there is no local fallback.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = ReadyResponse),
        (status = 503, description = "Service is unhealthy", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let managed_store = check_managed_store(&state).await;
    let chain = check_chain(&state).await;
    let local_fallback = state.persistence.fallback_enabled();

    let store_ok = local_fallback || managed_store.as_deref().map(|s| s == "ok").unwrap_or(true);
    let chain_ok = chain.as_deref().map(|s| s == "ok").unwrap_or(true);
    let all_ok = store_ok && chain_ok;

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            managed_store,
            local_fallback,
            chain,
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
