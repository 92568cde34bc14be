// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! USDC balance lookups with a short-lived LRU cache.
//!
//! Balances are cached per `(chain, owner)` to avoid an RPC round trip on
//! every poll. When the chain cannot be read the per-chain demo balance is
//! returned with `is_fallback = true`; the fallback is never cached.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use alloy::primitives::{Address, U256};
use lru::LruCache;

use super::client::{bounded_read, ChainReader, DEFAULT_CHAIN_READ_TIMEOUT};
use super::types::{ChainKey, TokenBalance, USDC_TOKEN};
use super::units::format_display;

/// Default time-to-live for a cached balance.
pub const DEFAULT_BALANCE_TTL: Duration = Duration::from_secs(10);

/// Cached entry: raw balance + insertion timestamp.
struct CacheEntry {
    balance: U256,
    inserted_at: Instant,
}

/// Balance reader that never fails towards its caller.
pub struct BalanceReader {
    reader: Arc<dyn ChainReader>,
    cache: Mutex<LruCache<(ChainKey, Address), CacheEntry>>,
    ttl: Duration,
    read_timeout: Duration,
}

impl BalanceReader {
    /// Create a reader with the given cache capacity and TTL.
    pub fn new(reader: Arc<dyn ChainReader>, capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            reader,
            cache: Mutex::new(LruCache::new(capacity)),
            ttl,
            read_timeout: DEFAULT_CHAIN_READ_TIMEOUT,
        }
    }

    /// Give up on a chain read after `timeout` and serve the fallback.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Current USDC balance, or the documented fallback when unavailable.
    pub async fn balance(&self, chain: ChainKey, owner: Address) -> TokenBalance {
        if let Some(balance) = self.cached(chain, owner) {
            return Self::to_view(chain, owner, balance);
        }

        let read = self.reader.token_balance(chain, owner);
        match bounded_read(self.read_timeout, read).await {
            Ok(balance) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.put(
                        (chain, owner),
                        CacheEntry {
                            balance,
                            inserted_at: Instant::now(),
                        },
                    );
                }
                Self::to_view(chain, owner, balance)
            }
            Err(e) => {
                tracing::warn!(
                    chain = %chain,
                    owner = %owner,
                    error = %e,
                    "Balance unavailable, using fallback"
                );
                TokenBalance {
                    chain,
                    owner: owner.to_string(),
                    symbol: USDC_TOKEN.symbol.to_string(),
                    balance_raw: None,
                    balance_formatted: chain.fallback_balance().to_string(),
                    is_fallback: true,
                }
            }
        }
    }

    /// Drop the cached balance, e.g. after a transfer was submitted.
    pub fn invalidate(&self, chain: ChainKey, owner: Address) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.pop(&(chain, owner));
        }
    }

    fn cached(&self, chain: ChainKey, owner: Address) -> Option<U256> {
        let mut cache = self.cache.lock().ok()?;
        let key = (chain, owner);
        if let Some(entry) = cache.get(&key) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.balance);
            }
            // Expired
            cache.pop(&key);
        }
        None
    }

    fn to_view(chain: ChainKey, owner: Address, balance: U256) -> TokenBalance {
        TokenBalance {
            chain,
            owner: owner.to_string(),
            symbol: USDC_TOKEN.symbol.to_string(),
            balance_raw: Some(balance.to_string()),
            balance_formatted: format_display(balance, USDC_TOKEN.decimals),
            is_fallback: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReader {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ChainReader for CountingReader {
        async fn token_balance(&self, _: ChainKey, _: Address) -> Result<U256, BridgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(BridgeError::NetworkError("offline".into()))
            } else {
                Ok(U256::from(12_340_000u64))
            }
        }

        async fn token_allowance(
            &self,
            _: ChainKey,
            _: Address,
            _: Address,
        ) -> Result<U256, BridgeError> {
            Ok(U256::ZERO)
        }
    }

    fn reader(fail: bool) -> Arc<CountingReader> {
        Arc::new(CountingReader {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn balance_is_formatted_and_cached() {
        let inner = reader(false);
        let balances = BalanceReader::new(inner.clone(), 8, Duration::from_secs(60));
        let owner = Address::repeat_byte(1);

        let first = balances.balance(ChainKey::ArbitrumSepolia, owner).await;
        let second = balances.balance(ChainKey::ArbitrumSepolia, owner).await;

        assert_eq!(first.balance_formatted, "12.34");
        assert!(!first.is_fallback);
        assert_eq!(second.balance_raw.as_deref(), Some("12340000"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_a_fresh_read() {
        let inner = reader(false);
        let balances = BalanceReader::new(inner.clone(), 8, Duration::from_secs(60));
        let owner = Address::repeat_byte(2);

        balances.balance(ChainKey::EthereumSepolia, owner).await;
        balances.invalidate(ChainKey::EthereumSepolia, owner);
        balances.balance(ChainKey::EthereumSepolia, owner).await;

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn unavailable_chain_degrades_to_fallback() {
        let inner = reader(true);
        let balances = BalanceReader::new(inner.clone(), 8, Duration::from_secs(60));
        let owner = Address::repeat_byte(3);

        let arb = balances.balance(ChainKey::ArbitrumSepolia, owner).await;
        assert!(arb.is_fallback);
        assert_eq!(arb.balance_formatted, "5000.00");
        assert!(arb.balance_raw.is_none());

        let eth = balances.balance(ChainKey::EthereumSepolia, owner).await;
        assert_eq!(eth.balance_formatted, "3500.00");

        // Fallbacks are not cached
        balances.balance(ChainKey::ArbitrumSepolia, owner).await;
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    /// Never answers.
    struct HangingReader;

    #[async_trait]
    impl ChainReader for HangingReader {
        async fn token_balance(&self, _: ChainKey, _: Address) -> Result<U256, BridgeError> {
            std::future::pending().await
        }

        async fn token_allowance(
            &self,
            _: ChainKey,
            _: Address,
            _: Address,
        ) -> Result<U256, BridgeError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn unanswered_read_degrades_to_fallback() {
        let balances = BalanceReader::new(Arc::new(HangingReader), 8, Duration::from_secs(60))
            .with_read_timeout(Duration::from_millis(20));

        let started = Instant::now();
        let view = balances
            .balance(ChainKey::ArbitrumSepolia, Address::repeat_byte(5))
            .await;

        assert!(view.is_fallback);
        assert_eq!(view.balance_formatted, "5000.00");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn expired_entries_are_refetched() {
        let inner = reader(false);
        let balances = BalanceReader::new(inner.clone(), 8, Duration::from_millis(1));
        let owner = Address::repeat_byte(4);

        balances.balance(ChainKey::ArbitrumSepolia, owner).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        balances.balance(ChainKey::ArbitrumSepolia, owner).await;

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
