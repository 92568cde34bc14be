// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API that are not domain types
//! themselves. Transaction records and bridge requests are served as-is from
//! [`crate::bridge::record`].

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::blockchain::{format_amount, parse_address, parse_amount, ChainKey, USDC_TOKEN};
use crate::bridge::{AllowanceQuery, AllowanceStatus, BridgeStatus, TransactionRecord, TOTAL_STAGES};
use crate::error::BridgeError;

// =============================================================================
// Transactions
// =============================================================================

/// Transaction history page.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<TransactionRecord>,
    pub total: usize,
}

/// Progress projection of a single record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    pub id: Uuid,
    pub status: BridgeStatus,
    pub stage_index: u8,
    pub total_stages: u8,
    /// Always within [0, 100]
    pub progress_percent: u8,
}

impl From<&TransactionRecord> for ProgressResponse {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            id: record.id,
            status: record.status,
            stage_index: record.stage_index,
            total_stages: TOTAL_STAGES,
            progress_percent: record.progress_percent(),
        }
    }
}

// =============================================================================
// Approvals
// =============================================================================

/// Allowance check for the bridge spender.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceCheckRequest {
    pub chain: ChainKey,
    /// Token owner address
    pub owner: String,
    /// Spender address; defaults to the configured bridge contract
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spender: Option<String>,
    /// Human-readable USDC amount
    pub amount: String,
}

impl AllowanceCheckRequest {
    pub fn to_query(&self, default_spender: Address) -> Result<AllowanceQuery, BridgeError> {
        let spender = match &self.spender {
            Some(raw) => parse_address(raw)?,
            None => default_spender,
        };
        Ok(AllowanceQuery {
            chain: self.chain,
            owner: parse_address(&self.owner)?,
            spender,
            amount: parse_amount(&self.amount, USDC_TOKEN.decimals)?,
        })
    }
}

/// Approval request: exact amount or unlimited.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(flatten)]
    pub check: AllowanceCheckRequest,
    #[serde(default)]
    pub unlimited: bool,
}

/// Allowance against a requested amount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceResponse {
    pub chain: ChainKey,
    pub owner: String,
    pub spender: String,
    /// Requested amount (human-readable)
    pub required: String,
    /// Current allowance (human-readable); absent when unreadable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowance: Option<String>,
    /// True when the allowance is unlimited
    pub unlimited: bool,
    pub needs_approval: bool,
}

impl AllowanceResponse {
    pub fn new(query: &AllowanceQuery, status: &AllowanceStatus) -> Self {
        Self {
            chain: query.chain,
            owner: query.owner.to_string(),
            spender: query.spender.to_string(),
            required: format_amount(status.required, USDC_TOKEN.decimals),
            allowance: status
                .allowance
                .map(|a| format_amount(a, USDC_TOKEN.decimals)),
            unlimited: status.allowance == Some(U256::MAX),
            needs_approval: status.needs_approval,
        }
    }
}

// =============================================================================
// Wallet
// =============================================================================

/// Bridge wallet connection state.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatusResponse {
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<u64>,
}

/// Result of a network switch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SwitchNetworkResponse {
    pub chain_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::record::BridgeRequest;

    #[test]
    fn progress_from_record() {
        let record = TransactionRecord::new(
            &BridgeRequest {
                source_chain: ChainKey::ArbitrumSepolia,
                dest_chain: ChainKey::EthereumSepolia,
                amount: "5".into(),
                privacy_requested: false,
                recipient: None,
            },
            None,
        );
        let progress = ProgressResponse::from(&record);
        assert_eq!(progress.total_stages, 4);
        assert_eq!(progress.progress_percent, 0);

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["stageIndex"], 0);
        assert_eq!(json["status"], "created");
    }

    #[test]
    fn check_request_builds_query() {
        let request: AllowanceCheckRequest = serde_json::from_str(
            r#"{"chain":"ethereum-sepolia","owner":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","amount":"50"}"#,
        )
        .unwrap();
        let query = request.to_query(Address::repeat_byte(0x22)).unwrap();
        assert_eq!(query.spender, Address::repeat_byte(0x22));
        assert_eq!(query.amount, U256::from(50_000_000u64));

        let bad = AllowanceCheckRequest {
            owner: "nope".into(),
            ..request
        };
        assert!(bad.to_query(Address::ZERO).is_err());
    }

    #[test]
    fn approve_request_flattens_check() {
        let request: ApproveRequest = serde_json::from_str(
            r#"{"chain":"arbitrum-sepolia","owner":"0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa","amount":"1","unlimited":true}"#,
        )
        .unwrap();
        assert!(request.unlimited);
        assert_eq!(request.check.amount, "1");
    }

    #[test]
    fn allowance_response_formats_amounts() {
        let query = AllowanceQuery {
            chain: ChainKey::ArbitrumSepolia,
            owner: Address::repeat_byte(1),
            spender: Address::repeat_byte(2),
            amount: U256::from(50_000_000u64),
        };
        let status = AllowanceStatus {
            allowance: Some(U256::from(10_000_000u64)),
            required: query.amount,
            needs_approval: true,
        };
        let response = AllowanceResponse::new(&query, &status);
        assert_eq!(response.required, "50");
        assert_eq!(response.allowance.as_deref(), Some("10"));
        assert!(!response.unlimited);
        assert!(response.needs_approval);
    }
}
