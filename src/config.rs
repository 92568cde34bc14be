// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variables are read once at startup into [`BridgeConfig`].
//! Invalid values are logged and replaced by their defaults.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Root directory for persisted transactions | `./data` |
//! | `STORAGE_BACKEND` | `file`, `redb` or `memory` | `file` |
//! | `PROTECTOR_MODE` | `simulated` or `live` | `simulated` |
//! | `PROTECTION_SERVICE_URL` | Base URL of the protection gateway | Required for `live` |
//! | `SIMULATED_LATENCY_MIN_MS` | Lower bound of simulated protection latency | `2000` |
//! | `SIMULATED_LATENCY_MAX_MS` | Upper bound of simulated protection latency | `3000` |
//! | `STAGE_TIMEOUT_SECS` | Upper bound for any lifecycle stage | `60` |
//! | `CHAIN_READ_TIMEOUT_MS` | Upper bound for a balance or allowance read | `5000` |
//! | `WALLET_KEY_PATH` | PEM or hex private key for the bridge wallet | Optional |
//! | `BRIDGE_SPENDER` | Address approved to move USDC | zero address |
//! | `ARBITRUM_SEPOLIA_RPC_URL` | JSON-RPC endpoint | public endpoint |
//! | `ETHEREUM_SEPOLIA_RPC_URL` | JSON-RPC endpoint | public endpoint |
//! | `BELLECOUR_RPC_URL` | JSON-RPC endpoint | public endpoint |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;

use crate::blockchain::{ChainKey, BELLECOUR, DEFAULT_BRIDGE_SPENDER, DEFAULT_CHAIN_READ_TIMEOUT};
use crate::bridge::confidentiality::{DEFAULT_SIMULATED_MAX, DEFAULT_SIMULATED_MIN};
use crate::bridge::orchestrator::DEFAULT_STAGE_TIMEOUT;
use crate::storage::paths::DATA_ROOT;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Environment variable name for the data directory path.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const STORAGE_BACKEND_ENV: &str = "STORAGE_BACKEND";
pub const PROTECTOR_MODE_ENV: &str = "PROTECTOR_MODE";
pub const PROTECTION_SERVICE_URL_ENV: &str = "PROTECTION_SERVICE_URL";
pub const SIMULATED_LATENCY_MIN_ENV: &str = "SIMULATED_LATENCY_MIN_MS";
pub const SIMULATED_LATENCY_MAX_ENV: &str = "SIMULATED_LATENCY_MAX_MS";
pub const STAGE_TIMEOUT_ENV: &str = "STAGE_TIMEOUT_SECS";
pub const CHAIN_READ_TIMEOUT_ENV: &str = "CHAIN_READ_TIMEOUT_MS";

/// Private key file for the bridge wallet.
///
/// When unset the service runs without a wallet: reads work, approvals and
/// live protection report `NotConnected`.
pub const WALLET_KEY_PATH_ENV: &str = "WALLET_KEY_PATH";

pub const BRIDGE_SPENDER_ENV: &str = "BRIDGE_SPENDER";
pub const ARBITRUM_SEPOLIA_RPC_ENV: &str = "ARBITRUM_SEPOLIA_RPC_URL";
pub const ETHEREUM_SEPOLIA_RPC_ENV: &str = "ETHEREUM_SEPOLIA_RPC_URL";
pub const BELLECOUR_RPC_ENV: &str = "BELLECOUR_RPC_URL";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Where transaction records are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    File,
    Redb,
    Memory,
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "redb" => Ok(Self::Redb),
            "memory" => Ok(Self::Memory),
            other => Err(format!("unknown storage backend `{other}`")),
        }
    }
}

/// Which confidentiality adapter to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectorKind {
    Simulated,
    Live,
}

impl FromStr for ProtectorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" => Ok(Self::Simulated),
            "live" => Ok(Self::Live),
            other => Err(format!("unknown protector mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Read `LOG_FORMAT` directly; needed before tracing is initialized.
    pub fn from_env() -> Self {
        match std::env::var(LOG_FORMAT_ENV) {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub protector: ProtectorKind,
    pub protection_service_url: Option<String>,
    pub simulated_latency_min: Duration,
    pub simulated_latency_max: Duration,
    pub stage_timeout: Duration,
    pub chain_read_timeout: Duration,
    pub wallet_key_path: Option<PathBuf>,
    pub bridge_spender: Address,
    pub rpc_urls: HashMap<ChainKey, String>,
    pub bellecour_rpc_url: String,
}

impl BridgeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut rpc_urls = HashMap::new();
        for (chain, env) in [
            (ChainKey::ArbitrumSepolia, ARBITRUM_SEPOLIA_RPC_ENV),
            (ChainKey::EthereumSepolia, ETHEREUM_SEPOLIA_RPC_ENV),
        ] {
            let url = var(env).unwrap_or_else(|| chain.network().rpc_url.to_string());
            rpc_urls.insert(chain, url);
        }

        let simulated_latency_min = Duration::from_millis(parse_or(
            SIMULATED_LATENCY_MIN_ENV,
            var(SIMULATED_LATENCY_MIN_ENV),
            DEFAULT_SIMULATED_MIN.as_millis() as u64,
        ));
        let simulated_latency_max = Duration::from_millis(parse_or(
            SIMULATED_LATENCY_MAX_ENV,
            var(SIMULATED_LATENCY_MAX_ENV),
            DEFAULT_SIMULATED_MAX.as_millis() as u64,
        ));

        let stage_timeout_secs = parse_or(
            STAGE_TIMEOUT_ENV,
            var(STAGE_TIMEOUT_ENV),
            DEFAULT_STAGE_TIMEOUT.as_secs(),
        );
        let stage_timeout = if stage_timeout_secs == 0 {
            tracing::warn!(variable = STAGE_TIMEOUT_ENV, "Zero stage timeout, using default");
            DEFAULT_STAGE_TIMEOUT
        } else {
            Duration::from_secs(stage_timeout_secs)
        };

        let chain_read_timeout = match parse_or(
            CHAIN_READ_TIMEOUT_ENV,
            var(CHAIN_READ_TIMEOUT_ENV),
            DEFAULT_CHAIN_READ_TIMEOUT.as_millis() as u64,
        ) {
            0 => {
                tracing::warn!(variable = CHAIN_READ_TIMEOUT_ENV, "Zero read timeout, using default");
                DEFAULT_CHAIN_READ_TIMEOUT
            }
            ms => Duration::from_millis(ms),
        };

        Self {
            host: var(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(PORT_ENV, var(PORT_ENV), DEFAULT_PORT),
            data_dir: PathBuf::from(var(DATA_DIR_ENV).unwrap_or_else(|| DATA_ROOT.to_string())),
            storage: parse_or(STORAGE_BACKEND_ENV, var(STORAGE_BACKEND_ENV), StorageKind::File),
            protector: parse_or(
                PROTECTOR_MODE_ENV,
                var(PROTECTOR_MODE_ENV),
                ProtectorKind::Simulated,
            ),
            protection_service_url: var(PROTECTION_SERVICE_URL_ENV),
            simulated_latency_min,
            simulated_latency_max,
            stage_timeout,
            chain_read_timeout,
            wallet_key_path: var(WALLET_KEY_PATH_ENV).map(PathBuf::from),
            bridge_spender: parse_or(
                BRIDGE_SPENDER_ENV,
                var(BRIDGE_SPENDER_ENV),
                Address::from_str(DEFAULT_BRIDGE_SPENDER).unwrap_or(Address::ZERO),
            ),
            rpc_urls,
            bellecour_rpc_url: var(BELLECOUR_RPC_ENV)
                .unwrap_or_else(|| BELLECOUR.rpc_url.to_string()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// RPC endpoints keyed by chain id, including the confidential-compute
    /// network.
    pub fn wallet_rpc_urls(&self) -> HashMap<u64, String> {
        let mut urls: HashMap<u64, String> = self
            .rpc_urls
            .iter()
            .map(|(chain, url)| (chain.chain_id(), url.clone()))
            .collect();
        urls.insert(BELLECOUR.chain_id, self.bellecour_rpc_url.clone());
        urls
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(variable = name, value = %raw, error = %e, "Invalid configuration value, using default");
                default
            }
        },
    }
}
