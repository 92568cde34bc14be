// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::{error::ApiError, models::SwitchNetworkResponse, state::AppState};

/// Point the bridge wallet at the confidential-compute network.
///
/// Only meaningful when protection runs live; private transfers fail with
/// `encryptionFailed` while the wallet is on another network.
#[utoipa::path(
    post,
    path = "/v1/confidentiality/switch-network",
    tag = "Confidentiality",
    responses(
        (status = 200, body = SwitchNetworkResponse),
        (status = 401, description = "Wallet not connected"),
        (status = 409, description = "Protection is simulated")
    )
)]
pub async fn switch_network(
    State(state): State<AppState>,
) -> Result<Json<SwitchNetworkResponse>, ApiError> {
    let protector = state
        .live_protector
        .as_ref()
        .ok_or_else(|| ApiError::conflict("Protection is simulated; no network to switch to"))?;

    protector.switch_network().await?;
    Ok(Json(SwitchNetworkResponse {
        chain_id: protector.required_chain_id(),
    }))
}
