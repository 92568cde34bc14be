// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::blockchain::Wallet;
use crate::{error::ApiError, models::WalletStatusResponse, state::AppState};

async fn status_of(wallet: &dyn Wallet) -> WalletStatusResponse {
    match wallet.address().await {
        Ok(address) => WalletStatusResponse {
            connected: true,
            address: Some(address.to_string()),
            chain_id: wallet.chain_id().await.ok(),
        },
        Err(_) => WalletStatusResponse {
            connected: false,
            address: None,
            chain_id: None,
        },
    }
}

#[utoipa::path(
    get,
    path = "/v1/wallet",
    tag = "Wallet",
    responses((status = 200, body = WalletStatusResponse))
)]
pub async fn wallet_status(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    Json(status_of(state.wallet.as_ref()).await)
}

#[utoipa::path(
    post,
    path = "/v1/wallet/connect",
    tag = "Wallet",
    responses(
        (status = 200, body = WalletStatusResponse),
        (status = 401, description = "No signing key configured")
    )
)]
pub async fn connect_wallet(
    State(state): State<AppState>,
) -> Result<Json<WalletStatusResponse>, ApiError> {
    state.wallet.connect().await?;
    Ok(Json(status_of(state.wallet.as_ref()).await))
}

#[utoipa::path(
    post,
    path = "/v1/wallet/disconnect",
    tag = "Wallet",
    responses((status = 200, body = WalletStatusResponse))
)]
pub async fn disconnect_wallet(State(state): State<AppState>) -> Json<WalletStatusResponse> {
    state.wallet.disconnect().await;
    Json(status_of(state.wallet.as_ref()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::ChainKey;
    use crate::testing::app_state;

    #[tokio::test]
    async fn connect_and_disconnect_round_trip() {
        let (state, _, _) = app_state();

        let Json(status) = wallet_status(State(state.clone())).await;
        assert!(status.connected);
        assert_eq!(status.chain_id, Some(ChainKey::ArbitrumSepolia.chain_id()));

        let Json(status) = disconnect_wallet(State(state.clone())).await;
        assert!(!status.connected);
        assert!(status.address.is_none());

        let Json(status) = connect_wallet(State(state)).await.unwrap();
        assert!(status.connected);
        assert!(status.address.is_some());
    }
}
