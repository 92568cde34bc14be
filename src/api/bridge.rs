// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::bridge::{BridgeRequest, TransactionRecord};
use crate::error::ApiError;
use crate::models::{ListTransactionsResponse, ProgressResponse};
use crate::state::AppState;
use crate::storage::TransactionFilter;

/// Start a bridge transfer.
///
/// The record is persisted in `created` and driven in the background; poll
/// the transaction or its progress to follow it.
#[utoipa::path(
    post,
    path = "/v1/bridge",
    tag = "Bridge",
    request_body = BridgeRequest,
    responses(
        (status = 202, description = "Transfer accepted", body = TransactionRecord),
        (status = 400, description = "Invalid request")
    )
)]
pub async fn start_bridge(
    State(state): State<AppState>,
    Json(request): Json<BridgeRequest>,
) -> Result<(StatusCode, Json<TransactionRecord>), ApiError> {
    let record = state.orchestrator.start_bridge(request).await?;
    Ok((StatusCode::ACCEPTED, Json(record)))
}

/// Transaction history, newest first.
#[utoipa::path(
    get,
    path = "/v1/transactions",
    tag = "Transactions",
    params(TransactionFilter),
    responses((status = 200, body = ListTransactionsResponse))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Json<ListTransactionsResponse> {
    let transactions = state.store.list_filtered(&filter);
    Json(ListTransactionsResponse {
        total: transactions.len(),
        transactions,
    })
}

#[utoipa::path(
    get,
    path = "/v1/transactions/{id}",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, body = TransactionRecord),
        (status = 404, description = "Unknown transaction")
    )
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionRecord>, ApiError> {
    state
        .store
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Transaction {id} not found")))
}

/// Stage index and percentage for a single transaction.
#[utoipa::path(
    get,
    path = "/v1/transactions/{id}/progress",
    tag = "Transactions",
    params(("id" = Uuid, Path, description = "Transaction id")),
    responses(
        (status = 200, body = ProgressResponse),
        (status = 404, description = "Unknown transaction")
    )
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let record = state
        .store
        .get(id)
        .ok_or_else(|| ApiError::not_found(format!("Transaction {id} not found")))?;
    Ok(Json(ProgressResponse::from(&record)))
}
