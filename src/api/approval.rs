// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::error::ApiError;
use crate::models::{AllowanceCheckRequest, AllowanceResponse, ApproveRequest};
use crate::state::AppState;

/// Compare the spender's allowance against an amount.
///
/// An unreadable allowance is reported without `allowance` and with
/// `needsApproval: false`.
#[utoipa::path(
    post,
    path = "/v1/approval/check",
    tag = "Approval",
    request_body = AllowanceCheckRequest,
    responses(
        (status = 200, body = AllowanceResponse),
        (status = 400, description = "Invalid address or amount")
    )
)]
pub async fn check_allowance(
    State(state): State<AppState>,
    Json(request): Json<AllowanceCheckRequest>,
) -> Result<Json<AllowanceResponse>, ApiError> {
    let query = request.to_query(state.bridge_spender)?;
    let status = state.approvals.check(&query).await;
    Ok(Json(AllowanceResponse::new(&query, &status)))
}

/// Submit an approval through the bridge wallet and wait for it to be mined.
#[utoipa::path(
    post,
    path = "/v1/approval/approve",
    tag = "Approval",
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Allowance after the approval", body = AllowanceResponse),
        (status = 400, description = "Invalid request or owner is not the bridge wallet"),
        (status = 401, description = "Wallet not connected"),
        (status = 409, description = "Rejected by the wallet owner"),
        (status = 502, description = "Submission failed or reverted")
    )
)]
pub async fn approve(
    State(state): State<AppState>,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<AllowanceResponse>, ApiError> {
    let query = request.check.to_query(state.bridge_spender)?;
    let status = if request.unlimited {
        state.approvals.approve_unlimited(&query).await?
    } else {
        state.approvals.approve_exact(&query).await?
    };
    Ok(Json(AllowanceResponse::new(&query, &status)))
}
