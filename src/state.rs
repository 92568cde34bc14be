// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use alloy::primitives::Address;

use crate::blockchain::{BalanceReader, Wallet};
use crate::bridge::{ApprovalCoordinator, BridgeOrchestrator, LiveProtector};
use crate::storage::TransactionStore;

/// Shared handles for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<TransactionStore>,
    pub orchestrator: Arc<BridgeOrchestrator>,
    pub approvals: Arc<ApprovalCoordinator>,
    pub balances: Arc<BalanceReader>,
    pub wallet: Arc<dyn Wallet>,
    /// Present only when protection runs against the real network
    pub live_protector: Option<Arc<LiveProtector>>,
    /// Default spender for allowance checks
    pub bridge_spender: Address,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<BridgeOrchestrator>,
        approvals: Arc<ApprovalCoordinator>,
        balances: Arc<BalanceReader>,
        wallet: Arc<dyn Wallet>,
        bridge_spender: Address,
    ) -> Self {
        Self {
            store: orchestrator.store().clone(),
            orchestrator,
            approvals,
            balances,
            wallet,
            live_protector: None,
            bridge_spender,
        }
    }

    pub fn with_live_protector(mut self, protector: Arc<LiveProtector>) -> Self {
        self.live_protector = Some(protector);
        self
    }
}
