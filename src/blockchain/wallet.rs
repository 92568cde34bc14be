// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet boundary: connection state, network selection and transaction
//! submission on behalf of the bridge user.

use std::collections::HashMap;
use std::time::Duration;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, Bytes, B256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::BridgeError;

/// Default delay between receipt polls.
const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of receipt polls before giving up.
const DEFAULT_RECEIPT_MAX_POLLS: u32 = 90;

/// Wallet boundary used by the approval and confidentiality flows.
///
/// Every call may fail with [`BridgeError::NotConnected`],
/// [`BridgeError::UserRejected`] or [`BridgeError::NetworkError`].
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Connect and return the active account.
    async fn connect(&self) -> Result<Address, BridgeError>;

    async fn disconnect(&self);

    /// Active account.
    async fn address(&self) -> Result<Address, BridgeError>;

    /// Chain the wallet is currently pointed at.
    async fn chain_id(&self) -> Result<u64, BridgeError>;

    async fn switch_network(&self, chain_id: u64) -> Result<(), BridgeError>;

    /// Sign and broadcast a contract call, returning its hash.
    async fn send_transaction(
        &self,
        chain_id: u64,
        to: Address,
        data: Bytes,
    ) -> Result<B256, BridgeError>;

    /// Wait until the transaction is mined. Returns `false` if it reverted.
    async fn wait_for_receipt(&self, chain_id: u64, tx_hash: B256) -> Result<bool, BridgeError>;
}

#[derive(Debug, Clone, Copy)]
struct WalletState {
    connected: bool,
    chain_id: u64,
}

/// Wallet backed by a local secp256k1 key.
pub struct SignerWallet {
    signer: PrivateKeySigner,
    rpc_urls: HashMap<u64, url::Url>,
    state: RwLock<WalletState>,
    receipt_poll_interval: Duration,
    receipt_max_polls: u32,
}

impl SignerWallet {
    /// Create a disconnected wallet.
    ///
    /// `rpc_urls` maps chain ids to JSON-RPC endpoints; `initial_chain_id`
    /// must be one of them.
    pub fn new(
        signer: PrivateKeySigner,
        rpc_urls: HashMap<u64, String>,
        initial_chain_id: u64,
    ) -> Result<Self, BridgeError> {
        let mut parsed = HashMap::new();
        for (chain_id, raw) in rpc_urls {
            let url: url::Url = raw.parse().map_err(|e: url::ParseError| {
                BridgeError::Validation(format!("Invalid RPC URL for chain {chain_id}: {e}"))
            })?;
            parsed.insert(chain_id, url);
        }
        if !parsed.contains_key(&initial_chain_id) {
            return Err(BridgeError::Validation(format!(
                "No RPC URL configured for initial chain {initial_chain_id}"
            )));
        }

        Ok(Self {
            signer,
            rpc_urls: parsed,
            state: RwLock::new(WalletState {
                connected: false,
                chain_id: initial_chain_id,
            }),
            receipt_poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
            receipt_max_polls: DEFAULT_RECEIPT_MAX_POLLS,
        })
    }

    fn rpc_url(&self, chain_id: u64) -> Result<url::Url, BridgeError> {
        self.rpc_urls
            .get(&chain_id)
            .cloned()
            .ok_or_else(|| BridgeError::NetworkError(format!("Unsupported chain {chain_id}")))
    }

    async fn ensure_connected(&self) -> Result<WalletState, BridgeError> {
        let state = *self.state.read().await;
        if state.connected {
            Ok(state)
        } else {
            Err(BridgeError::NotConnected)
        }
    }
}

/// Map a provider error to the wallet taxonomy.
fn classify_send_error(message: String) -> BridgeError {
    let lower = message.to_ascii_lowercase();
    if lower.contains("rejected") || lower.contains("denied") {
        BridgeError::UserRejected
    } else {
        BridgeError::NetworkError(message)
    }
}

#[async_trait]
impl Wallet for SignerWallet {
    async fn connect(&self) -> Result<Address, BridgeError> {
        let mut state = self.state.write().await;
        state.connected = true;
        tracing::info!(address = %self.signer.address(), chain_id = state.chain_id, "Wallet connected");
        Ok(self.signer.address())
    }

    async fn disconnect(&self) {
        self.state.write().await.connected = false;
        tracing::info!(address = %self.signer.address(), "Wallet disconnected");
    }

    async fn address(&self) -> Result<Address, BridgeError> {
        self.ensure_connected().await?;
        Ok(self.signer.address())
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        Ok(self.ensure_connected().await?.chain_id)
    }

    async fn switch_network(&self, chain_id: u64) -> Result<(), BridgeError> {
        self.ensure_connected().await?;
        self.rpc_url(chain_id)?;
        let mut state = self.state.write().await;
        let previous = state.chain_id;
        state.chain_id = chain_id;
        tracing::info!(from = previous, to = chain_id, "Wallet switched network");
        Ok(())
    }

    async fn send_transaction(
        &self,
        chain_id: u64,
        to: Address,
        data: Bytes,
    ) -> Result<B256, BridgeError> {
        self.ensure_connected().await?;
        let url = self.rpc_url(chain_id)?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(url);

        let tx = TransactionRequest::default()
            .from(self.signer.address())
            .to(to)
            .input(data.into());

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_send_error(format!("Failed to send: {e}")))?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(chain_id, tx_hash = %tx_hash, "Transaction broadcast");
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, chain_id: u64, tx_hash: B256) -> Result<bool, BridgeError> {
        let url = self.rpc_url(chain_id)?;
        let provider = ProviderBuilder::new().connect_http(url);

        for _ in 0..self.receipt_max_polls {
            let receipt = provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| BridgeError::NetworkError(format!("Failed to get receipt: {e}")))?;

            if let Some(receipt) = receipt {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    block_number = ?receipt.block_number,
                    success = receipt.status(),
                    "Transaction mined"
                );
                return Ok(receipt.status());
            }

            tokio::time::sleep(self.receipt_poll_interval).await;
        }

        Err(BridgeError::NetworkError(format!(
            "Transaction {tx_hash} not mined after {} polls",
            self.receipt_max_polls
        )))
    }
}

/// Placeholder used when no signing key is configured. Never connects.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedWallet;

#[async_trait]
impl Wallet for DetachedWallet {
    async fn connect(&self) -> Result<Address, BridgeError> {
        Err(BridgeError::NotConnected)
    }

    async fn disconnect(&self) {}

    async fn address(&self) -> Result<Address, BridgeError> {
        Err(BridgeError::NotConnected)
    }

    async fn chain_id(&self) -> Result<u64, BridgeError> {
        Err(BridgeError::NotConnected)
    }

    async fn switch_network(&self, _: u64) -> Result<(), BridgeError> {
        Err(BridgeError::NotConnected)
    }

    async fn send_transaction(&self, _: u64, _: Address, _: Bytes) -> Result<B256, BridgeError> {
        Err(BridgeError::NotConnected)
    }

    async fn wait_for_receipt(&self, _: u64, _: B256) -> Result<bool, BridgeError> {
        Err(BridgeError::NotConnected)
    }
}
