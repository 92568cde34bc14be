// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read-only chain access for token balances and allowances.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    providers::ProviderBuilder,
};
use async_trait::async_trait;

use super::erc20::Erc20Contract;
use super::types::ChainKey;
use crate::error::BridgeError;

/// Chain read boundary.
///
/// Implementations report failures as errors; callers decide on the
/// documented fallback (see [`super::BalanceReader`] and the approval
/// coordinator) instead of propagating them.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// USDC balance of `owner` in base units.
    async fn token_balance(&self, chain: ChainKey, owner: Address) -> Result<U256, BridgeError>;

    /// USDC allowance granted by `owner` to `spender` in base units.
    async fn token_allowance(
        &self,
        chain: ChainKey,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BridgeError>;
}

/// Upper bound for a single balance or allowance read.
pub const DEFAULT_CHAIN_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a chain read, treating an unanswered call as a network error.
pub(crate) async fn bounded_read<T>(
    limit: Duration,
    read: impl Future<Output = Result<T, BridgeError>>,
) -> Result<T, BridgeError> {
    tokio::time::timeout(limit, read).await.unwrap_or_else(|_| {
        Err(BridgeError::NetworkError(format!(
            "Chain read timed out after {} ms",
            limit.as_millis()
        )))
    })
}

/// JSON-RPC backed reader for the supported testnets.
pub struct EvmChainReader {
    rpc_urls: HashMap<ChainKey, url::Url>,
}

impl EvmChainReader {
    /// Create a reader from per-chain RPC endpoints.
    pub fn new(rpc_urls: &HashMap<ChainKey, String>) -> Result<Self, BridgeError> {
        let mut parsed = HashMap::new();
        for (chain, raw) in rpc_urls {
            let url: url::Url = raw.parse().map_err(|e: url::ParseError| {
                BridgeError::Validation(format!("Invalid RPC URL for {chain}: {e}"))
            })?;
            parsed.insert(*chain, url);
        }
        Ok(Self { rpc_urls: parsed })
    }

    fn rpc_url(&self, chain: ChainKey) -> Result<url::Url, BridgeError> {
        self.rpc_urls
            .get(&chain)
            .cloned()
            .ok_or_else(|| BridgeError::NetworkError(format!("No RPC provider for {chain}")))
    }
}

#[async_trait]
impl ChainReader for EvmChainReader {
    async fn token_balance(&self, chain: ChainKey, owner: Address) -> Result<U256, BridgeError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url(chain)?);
        let token = Erc20Contract::new(&provider, chain.usdc_address())?;
        token.balance_of(owner).await
    }

    async fn token_allowance(
        &self,
        chain: ChainKey,
        owner: Address,
        spender: Address,
    ) -> Result<U256, BridgeError> {
        let provider = ProviderBuilder::new().connect_http(self.rpc_url(chain)?);
        let token = Erc20Contract::new(&provider, chain.usdc_address())?;
        token.allowance(owner, spender).await
    }
}
