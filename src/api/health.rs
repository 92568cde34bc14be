// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::bridge::ProtectionMode;
use crate::state::AppState;

/// Readiness report.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadyResponse {
    /// "ok" when storage is readable, "degraded" otherwise
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthChecks {
    pub service: String,
    /// Backend name and whether the transaction document can be read
    pub storage: StorageCheck,
    /// "connected" or "disconnected"; does not affect readiness
    pub wallet: String,
    /// "live" or "simulated"
    pub protector: String,
    /// Lifecycles currently being driven
    pub in_flight: usize,
    /// Records held by the store
    pub transactions: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StorageCheck {
    pub backend: String,
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Full component report; 503 when storage cannot be read.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All components usable", body = ReadyResponse),
        (status = 503, description = "Storage unreadable", body = ReadyResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let storage_ok = match state.store.probe() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(backend = state.store.backend_name(), error = %e, "Storage probe failed");
            false
        }
    };

    let wallet = match state.wallet.address().await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };
    let protector = match state.orchestrator.protector().mode() {
        ProtectionMode::Live => "live",
        ProtectionMode::Simulated => "simulated",
    };

    let checks = HealthChecks {
        service: "ok".into(),
        storage: StorageCheck {
            backend: state.store.backend_name().into(),
            status: if storage_ok { "ok" } else { "unreadable" }.into(),
        },
        wallet: wallet.into(),
        protector: protector.into(),
        in_flight: state.orchestrator.in_flight(),
        transactions: state.store.len(),
    };

    let (code, status) = if storage_ok {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        code,
        Json(ReadyResponse {
            status: status.into(),
            checks,
        }),
    )
}

/// Process liveness only.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, body = ReadyResponse),
        (status = 503, body = ReadyResponse)
    )
)]
pub async fn readiness(state: State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    health(state).await
}
