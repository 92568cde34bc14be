// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::blockchain::{parse_address, ChainKey, TokenBalance};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BalanceQuery {
    /// Bypass the cache
    #[serde(default)]
    pub refresh: bool,
}

/// USDC balance of an address on a bridge network.
///
/// Never fails for a well-formed request: when the chain cannot be read the
/// network's fallback balance is returned with `isFallback: true`.
#[utoipa::path(
    get,
    path = "/v1/balance/{chain}/{owner}",
    tag = "Balance",
    params(
        ("chain" = String, Path, description = "arbitrum-sepolia or ethereum-sepolia"),
        ("owner" = String, Path, description = "Owner address"),
        BalanceQuery
    ),
    responses(
        (status = 200, body = TokenBalance),
        (status = 400, description = "Unknown chain or malformed address")
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path((chain, owner)): Path<(String, String)>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<TokenBalance>, ApiError> {
    let chain: ChainKey = chain.parse().map_err(ApiError::bad_request)?;
    let owner = parse_address(&owner)?;

    if query.refresh {
        state.balances.invalidate(chain, owner);
    }
    Ok(Json(state.balances.balance(chain, owner).await))
}
