// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain metadata, token constants and boundary value types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// EVM network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Arbitrum Sepolia testnet configuration.
pub const ARBITRUM_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Arbitrum Sepolia",
    chain_id: 421614,
    rpc_url: "https://sepolia-rollup.arbitrum.io/rpc",
    explorer_url: "https://sepolia.arbiscan.io",
};

/// Ethereum Sepolia testnet configuration.
pub const ETHEREUM_SEPOLIA: NetworkConfig = NetworkConfig {
    name: "Ethereum Sepolia",
    chain_id: 11155111,
    rpc_url: "https://rpc.sepolia.org",
    explorer_url: "https://sepolia.etherscan.io",
};

/// iExec Bellecour sidechain, where confidential data protection runs.
pub const BELLECOUR: NetworkConfig = NetworkConfig {
    name: "iExec Bellecour",
    chain_id: 134,
    rpc_url: "https://bellecour.iex.ec",
    explorer_url: "https://blockscout-bellecour.iex.ec",
};

/// Identifier of a network that can be bridged from or to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum ChainKey {
    ArbitrumSepolia,
    EthereumSepolia,
}

impl ChainKey {
    /// Every supported bridge network.
    pub const ALL: [ChainKey; 2] = [ChainKey::ArbitrumSepolia, ChainKey::EthereumSepolia];

    /// Static network configuration.
    pub fn network(self) -> &'static NetworkConfig {
        match self {
            ChainKey::ArbitrumSepolia => &ARBITRUM_SEPOLIA,
            ChainKey::EthereumSepolia => &ETHEREUM_SEPOLIA,
        }
    }

    pub fn chain_id(self) -> u64 {
        self.network().chain_id
    }

    /// Wire identifier (`arbitrum-sepolia`, `ethereum-sepolia`).
    pub fn as_str(self) -> &'static str {
        match self {
            ChainKey::ArbitrumSepolia => "arbitrum-sepolia",
            ChainKey::EthereumSepolia => "ethereum-sepolia",
        }
    }

    /// USDC contract deployed on this network.
    pub fn usdc_address(self) -> &'static str {
        match self {
            ChainKey::ArbitrumSepolia => USDC_TOKEN.arbitrum_sepolia_address,
            ChainKey::EthereumSepolia => USDC_TOKEN.ethereum_sepolia_address,
        }
    }

    /// Balance reported when the chain cannot be read.
    pub fn fallback_balance(self) -> &'static str {
        match self {
            ChainKey::ArbitrumSepolia => "5000.00",
            ChainKey::EthereumSepolia => "3500.00",
        }
    }

    /// Resolve a chain id back to a bridge network.
    pub fn from_chain_id(chain_id: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.chain_id() == chain_id)
    }
}

impl fmt::Display for ChainKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| format!("Unsupported chain `{s}`"))
    }
}

/// The bridged ERC-20 asset.
#[derive(Debug, Clone)]
pub struct Erc20Token {
    pub symbol: &'static str,
    pub name: &'static str,
    pub decimals: u8,
    pub arbitrum_sepolia_address: &'static str,
    pub ethereum_sepolia_address: &'static str,
}

/// Circle's testnet USDC.
pub const USDC_TOKEN: Erc20Token = Erc20Token {
    symbol: "USDC",
    name: "USD Coin",
    decimals: 6,
    arbitrum_sepolia_address: "0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d",
    ethereum_sepolia_address: "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238",
};

/// Placeholder bridge contract used as the approval spender until one is deployed.
pub const DEFAULT_BRIDGE_SPENDER: &str = "0x0000000000000000000000000000000000000000";

/// Token balance as shown to callers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Network the balance was read from
    pub chain: ChainKey,
    /// Owner address
    pub owner: String,
    /// Token symbol
    pub symbol: String,
    /// Balance in smallest unit (absent when the fallback is used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_raw: Option<String>,
    /// Balance formatted with two decimals
    pub balance_formatted: String,
    /// True when the chain could not be read and the demo balance is shown
    pub is_fallback: bool,
}
