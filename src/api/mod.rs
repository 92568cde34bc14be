// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    blockchain::{ChainKey, TokenBalance},
    bridge::{BridgeRequest, BridgeStatus, FailureReason, ProtectionMode, TransactionRecord},
    models::{
        AllowanceCheckRequest, AllowanceResponse, ApproveRequest, ListTransactionsResponse,
        ProgressResponse, SwitchNetworkResponse, WalletStatusResponse,
    },
    state::AppState,
};

pub mod approval;
pub mod balance;
pub mod bridge;
pub mod confidentiality;
pub mod health;
pub mod wallet;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/bridge", post(bridge::start_bridge))
        .route("/transactions", get(bridge::list_transactions))
        .route("/transactions/{id}", get(bridge::get_transaction))
        .route("/transactions/{id}/progress", get(bridge::get_progress))
        .route("/balance/{chain}/{owner}", get(balance::get_balance))
        .route("/approval/check", post(approval::check_allowance))
        .route("/approval/approve", post(approval::approve))
        .route(
            "/confidentiality/switch-network",
            post(confidentiality::switch_network),
        )
        .route("/wallet", get(wallet::wallet_status))
        .route("/wallet/connect", post(wallet::connect_wallet))
        .route("/wallet/disconnect", post(wallet::disconnect_wallet))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id());

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware)
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        bridge::start_bridge,
        bridge::list_transactions,
        bridge::get_transaction,
        bridge::get_progress,
        balance::get_balance,
        approval::check_allowance,
        approval::approve,
        confidentiality::switch_network,
        wallet::wallet_status,
        wallet::connect_wallet,
        wallet::disconnect_wallet,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            BridgeRequest,
            TransactionRecord,
            BridgeStatus,
            FailureReason,
            ProtectionMode,
            ChainKey,
            TokenBalance,
            ListTransactionsResponse,
            ProgressResponse,
            AllowanceCheckRequest,
            ApproveRequest,
            AllowanceResponse,
            WalletStatusResponse,
            SwitchNetworkResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            health::StorageCheck
        )
    ),
    tags(
        (name = "Bridge", description = "Cross-chain USDC transfers"),
        (name = "Transactions", description = "Transaction history and progress"),
        (name = "Balance", description = "USDC balances"),
        (name = "Approval", description = "ERC-20 allowance checks and approvals"),
        (name = "Confidentiality", description = "Confidential-compute network"),
        (name = "Wallet", description = "Bridge wallet connection"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::app_state;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let (state, _, _) = app_state();
        let app = router(state);
        let _ = app.into_make_service();
    }

    #[test]
    fn openapi_lists_bridge_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/bridge",
            "/v1/transactions/{id}/progress",
            "/v1/balance/{chain}/{owner}",
            "/health/ready",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
