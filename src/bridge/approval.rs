// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token approval: checks whether the bridge spender may move the requested
//! amount and, if not, drives an ERC-20 `approve` through the wallet.
//!
//! The coordinator never retries. Failures surface to the caller as
//! `NotConnected`, `UserRejected` or `NetworkError`.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};

use crate::blockchain::client::bounded_read;
use crate::blockchain::{
    approve_calldata, parse_address, ChainKey, ChainReader, Wallet, DEFAULT_CHAIN_READ_TIMEOUT,
};
use crate::error::BridgeError;

/// Allowance question: may `spender` move `amount` of `owner`'s USDC on `chain`?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceQuery {
    pub chain: ChainKey,
    pub owner: Address,
    pub spender: Address,
    /// Requested amount in base units
    pub amount: U256,
}

/// Answer to an [`AllowanceQuery`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceStatus {
    /// Current allowance, `None` when the chain could not be read
    pub allowance: Option<U256>,
    pub required: U256,
    pub needs_approval: bool,
}

pub struct ApprovalCoordinator {
    reader: Arc<dyn ChainReader>,
    wallet: Arc<dyn Wallet>,
    read_timeout: Duration,
}

impl ApprovalCoordinator {
    pub fn new(reader: Arc<dyn ChainReader>, wallet: Arc<dyn Wallet>) -> Self {
        Self {
            reader,
            wallet,
            read_timeout: DEFAULT_CHAIN_READ_TIMEOUT,
        }
    }

    /// Report the allowance as unknown once a read takes longer than `timeout`.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Compare the current allowance against the requested amount.
    ///
    /// An unreadable or unanswered allowance is reported as unknown and does
    /// not force an approval.
    pub async fn check(&self, query: &AllowanceQuery) -> AllowanceStatus {
        let read = self
            .reader
            .token_allowance(query.chain, query.owner, query.spender);
        match bounded_read(self.read_timeout, read).await {
            Ok(allowance) => AllowanceStatus {
                allowance: Some(allowance),
                required: query.amount,
                needs_approval: allowance < query.amount,
            },
            Err(e) => {
                tracing::warn!(
                    chain = %query.chain,
                    owner = %query.owner,
                    spender = %query.spender,
                    error = %e,
                    "Allowance unavailable"
                );
                AllowanceStatus {
                    allowance: None,
                    required: query.amount,
                    needs_approval: false,
                }
            }
        }
    }

    /// Approve exactly the requested amount, then re-check.
    pub async fn approve_exact(&self, query: &AllowanceQuery) -> Result<AllowanceStatus, BridgeError> {
        self.approve(query, query.amount).await
    }

    /// Approve the maximum amount, then re-check.
    pub async fn approve_unlimited(
        &self,
        query: &AllowanceQuery,
    ) -> Result<AllowanceStatus, BridgeError> {
        self.approve(query, U256::MAX).await
    }

    async fn approve(
        &self,
        query: &AllowanceQuery,
        amount: U256,
    ) -> Result<AllowanceStatus, BridgeError> {
        let connected = self.wallet.address().await?;
        if connected != query.owner {
            return Err(BridgeError::Validation(format!(
                "Owner {} is not the connected wallet {connected}",
                query.owner
            )));
        }

        let chain_id = query.chain.chain_id();
        let token = parse_address(query.chain.usdc_address())?;
        let calldata = approve_calldata(query.spender, amount);

        let tx_hash = self
            .wallet
            .send_transaction(chain_id, token, calldata)
            .await?;
        tracing::info!(
            chain = %query.chain,
            spender = %query.spender,
            amount = %amount,
            tx_hash = %tx_hash,
            "Approval submitted"
        );

        if !self.wallet.wait_for_receipt(chain_id, tx_hash).await? {
            return Err(BridgeError::NetworkError(format!(
                "Approval {tx_hash} reverted"
            )));
        }

        let status = self.check(query).await;
        tracing::info!(
            chain = %query.chain,
            allowance = ?status.allowance,
            needs_approval = status.needs_approval,
            "Approval confirmed"
        );
        Ok(status)
    }
}
