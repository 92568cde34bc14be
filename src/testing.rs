// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory doubles for the wallet, chain and protection-service boundaries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::blockchain::{BalanceReader, ChainKey, ChainReader, Wallet, DEFAULT_BALANCE_TTL};
use crate::bridge::confidentiality::ProtectionService;
use crate::bridge::{ApprovalCoordinator, BridgeOrchestrator, InstantStageTiming, SimulatedProtector};
use crate::error::BridgeError;
use crate::state::AppState;
use crate::storage::{MemoryBackend, TransactionStore};

const APPROVE_SELECTOR: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];

/// Token state for both bridge networks.
#[derive(Default)]
pub struct MockChain {
    balances: Mutex<HashMap<(ChainKey, Address), U256>>,
    allowances: Mutex<HashMap<(ChainKey, Address, Address), U256>>,
    offline: AtomicBool,
}

impl MockChain {
    pub fn set_balance(&self, chain: ChainKey, owner: Address, amount: U256) {
        self.balances.lock().unwrap().insert((chain, owner), amount);
    }

    pub fn set_allowance(&self, chain: ChainKey, owner: Address, spender: Address, amount: U256) {
        self.allowances
            .lock()
            .unwrap()
            .insert((chain, owner, spender), amount);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> Result<(), BridgeError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(BridgeError::NetworkError("mock chain offline".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChainReader for MockChain {
    async fn token_balance(&self, chain: ChainKey, owner: Address) -> Result<U256, BridgeError> {
        self.ensure_online()?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&(chain, owner))
            .copied()
            .unwrap_or_default())
    }

    async fn token_allowance(
        &self,
        chain: ChainKey,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BridgeError> {
        self.ensure_online()?;
        Ok(self
            .allowances
            .lock()
            .unwrap()
            .get(&(chain, owner, spender))
            .copied()
            .unwrap_or_default())
    }
}

/// Wallet that records what it sends and applies ERC-20 approvals to an
/// attached [`MockChain`].
pub struct MockWallet {
    address: Address,
    connected: AtomicBool,
    chain_id: Mutex<u64>,
    reject_next: AtomicBool,
    revert: AtomicBool,
    chain: Option<Arc<MockChain>>,
    sent: Mutex<Vec<(u64, Address, Bytes)>>,
}

impl MockWallet {
    pub fn new(chain_id: u64) -> Self {
        Self {
            address: Address::repeat_byte(0xaa),
            connected: AtomicBool::new(false),
            chain_id: Mutex::new(chain_id),
            reject_next: AtomicBool::new(false),
            revert: AtomicBool::new(false),
            chain: None,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn with_chain(mut self, chain: Arc<MockChain>) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Start out connected.
    pub fn connected(self) -> Self {
        self.connected.store(true, Ordering::SeqCst);
        self
    }

    /// Make the next `send_transaction` fail as if the owner declined it.
    pub fn reject_next(&self) {
        self.reject_next.store(true, Ordering::SeqCst);
    }

    /// Make mined transactions report a revert.
    pub fn set_revert(&self, revert: bool) {
        self.revert.store(revert, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(u64, Address, Bytes)> {
        self.sent.lock().unwrap().clone()
    }

    fn ensure_connected(&self) -> Result<(), BridgeError> {
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(BridgeError::NotConnected)
        }
    }

    fn apply_approval(&self, chain_id: u64, data: &[u8]) {
        let (Some(chain), Some(key)) = (&self.chain, ChainKey::from_chain_id(chain_id)) else {
            return;
        };
        if data.len() != 68 || data[..4] != APPROVE_SELECTOR {
            return;
        }
        let spender = Address::from_slice(&data[16..36]);
        let amount = U256::from_be_slice(&data[36..68]);
        chain.set_allowance(key, self.address, spender, amount);
    }
}

#[async_trait]
impl Wallet for MockWallet {
    async fn connect(&self) -> Result<Address, BridgeError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(self.address)
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    async fn address(&self) -> Result<Address, BridgeError> {
        self.ensure_connected()?;
        Ok(self.address)
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        self.ensure_connected()?;
        Ok(*self.chain_id.lock().unwrap())
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), BridgeError> {
        self.ensure_connected()?;
        *self.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn send_transaction(
        &self,
        chain_id: u64,
        to: Address,
        data: Bytes,
    ) -> Result<B256, BridgeError> {
        self.ensure_connected()?;
        if self.reject_next.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::UserRejected);
        }
        if !self.revert.load(Ordering::SeqCst) {
            self.apply_approval(chain_id, &data);
        }
        self.sent.lock().unwrap().push((chain_id, to, data));
        Ok(B256::from(rand::random::<[u8; 32]>()))
    }

    async fn wait_for_receipt(&self, _: u64, _: B256) -> Result<bool, BridgeError> {
        Ok(!self.revert.load(Ordering::SeqCst))
    }
}

/// Protection service that returns a counter-based address or a fixed error.
#[derive(Default)]
pub struct MockProtectionService {
    pub fail_with: Mutex<Option<String>>,
    pub calls: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl ProtectionService for MockProtectionService {
    async fn protect_data(
        &self,
        name: &str,
        data: serde_json::Value,
    ) -> Result<String, BridgeError> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(BridgeError::ProtectionFailed(message));
        }
        let mut calls = self.calls.lock().unwrap();
        calls.push((name.to_string(), data));
        Ok(format!("0x{:040x}", calls.len()))
    }
}

/// Handler state over an in-memory store with zero-latency stages and a
/// connected mock wallet on Arbitrum Sepolia.
pub fn app_state() -> (AppState, Arc<MockChain>, Arc<MockWallet>) {
    let chain = Arc::new(MockChain::default());
    let wallet = Arc::new(
        MockWallet::new(ChainKey::ArbitrumSepolia.chain_id())
            .with_chain(chain.clone())
            .connected(),
    );
    let store = Arc::new(
        TransactionStore::open(Arc::new(MemoryBackend::new())).expect("memory store opens"),
    );
    let orchestrator = Arc::new(
        BridgeOrchestrator::new(
            store,
            Arc::new(SimulatedProtector::new(Duration::ZERO, Duration::ZERO)),
            Arc::new(InstantStageTiming),
        )
        .with_wallet(wallet.clone()),
    );
    let approvals = Arc::new(ApprovalCoordinator::new(chain.clone(), wallet.clone()));
    let balances = Arc::new(BalanceReader::new(chain.clone(), 16, DEFAULT_BALANCE_TTL));
    let state = AppState::new(
        orchestrator,
        approvals,
        balances,
        wallet.clone(),
        Address::repeat_byte(0x22),
    );
    (state, chain, wallet)
}
