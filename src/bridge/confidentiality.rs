// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confidential protection of transfer metadata.
//!
//! Two [`Protector`] variants share one contract and are chosen at start-up:
//!
//! - [`LiveProtector`] delegates to an external protection service running on
//!   the iExec Bellecour network and requires the wallet to be on that chain.
//! - [`SimulatedProtector`] waits a random bounded latency and returns a
//!   synthetic reference.
//!
//! The receipt carries the producing [`ProtectionMode`] so callers never have
//! to guess provenance from the reference itself. Neither variant
//! deduplicates: every call yields a fresh reference.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::record::{random_hash, ProtectionMode, TransactionRecord};
use crate::blockchain::{ChainKey, Wallet, BELLECOUR, USDC_TOKEN};
use crate::error::BridgeError;

/// Default bounds for simulated protection latency.
pub const DEFAULT_SIMULATED_MIN: Duration = Duration::from_millis(2000);
pub const DEFAULT_SIMULATED_MAX: Duration = Duration::from_millis(3000);

/// Timeout for calls to the protection service.
const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimal transfer intent handed to the protection service.
///
/// Never contains key material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionPayload {
    pub from_chain: ChainKey,
    pub to_chain: ChainKey,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    /// Unix milliseconds
    pub timestamp: i64,
}

impl ProtectionPayload {
    pub fn for_record(record: &TransactionRecord) -> Self {
        Self {
            from_chain: record.source_chain,
            to_chain: record.dest_chain,
            amount: record.amount.clone(),
            recipient: record.recipient.clone(),
            timestamp: record.created_at.timestamp_millis(),
        }
    }

    /// Dataset name registered with the protection service.
    pub fn dataset_name(&self) -> String {
        format!("SolCipher Bridge - {} {}", self.amount, USDC_TOKEN.symbol)
    }
}

/// Result of a successful protection call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionReceipt {
    /// Opaque reference to the protected data
    pub reference: String,
    pub mode: ProtectionMode,
}

#[async_trait]
pub trait Protector: Send + Sync {
    async fn protect(&self, payload: &ProtectionPayload) -> Result<ProtectionReceipt, BridgeError>;

    fn mode(&self) -> ProtectionMode;
}

// =============================================================================
// Simulated
// =============================================================================

/// Stand-in protector with realistic timing.
#[derive(Debug, Clone)]
pub struct SimulatedProtector {
    min_latency: Duration,
    max_latency: Duration,
}

impl Default for SimulatedProtector {
    fn default() -> Self {
        Self::new(DEFAULT_SIMULATED_MIN, DEFAULT_SIMULATED_MAX)
    }
}

impl SimulatedProtector {
    /// Bounds are reordered if given reversed.
    pub fn new(min_latency: Duration, max_latency: Duration) -> Self {
        Self {
            min_latency: min_latency.min(max_latency),
            max_latency: min_latency.max(max_latency),
        }
    }

    pub fn latency_bounds(&self) -> (Duration, Duration) {
        (self.min_latency, self.max_latency)
    }

    fn sample_latency(&self) -> Duration {
        if self.min_latency == self.max_latency {
            return self.min_latency;
        }
        let min = self.min_latency.as_millis() as u64;
        let max = self.max_latency.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

#[async_trait]
impl Protector for SimulatedProtector {
    async fn protect(&self, payload: &ProtectionPayload) -> Result<ProtectionReceipt, BridgeError> {
        let latency = self.sample_latency();
        tracing::debug!(
            latency_ms = latency.as_millis() as u64,
            amount = %payload.amount,
            "Simulating data protection"
        );
        tokio::time::sleep(latency).await;

        Ok(ProtectionReceipt {
            reference: random_hash(),
            mode: ProtectionMode::Simulated,
        })
    }

    fn mode(&self) -> ProtectionMode {
        ProtectionMode::Simulated
    }
}

// =============================================================================
// Live
// =============================================================================

/// External protection service.
#[async_trait]
pub trait ProtectionService: Send + Sync {
    /// Register `data` under `name` and return the protected data address.
    async fn protect_data(&self, name: &str, data: serde_json::Value)
        -> Result<String, BridgeError>;
}

#[derive(Debug, Deserialize)]
struct ProtectResponse {
    address: String,
}

/// HTTP client for a protection gateway exposing `POST /protect`.
#[derive(Debug, Clone)]
pub struct HttpProtectionService {
    endpoint: url::Url,
    client: reqwest::Client,
}

impl HttpProtectionService {
    pub fn new(base_url: &str) -> Result<Self, BridgeError> {
        let base: url::Url = base_url.parse().map_err(|e: url::ParseError| {
            BridgeError::Validation(format!("Invalid protection service URL: {e}"))
        })?;
        let endpoint = base
            .join("protect")
            .map_err(|e| BridgeError::Validation(format!("Invalid protection service URL: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(SERVICE_TIMEOUT)
            .build()
            .map_err(|e| BridgeError::ProtectionFailed(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { endpoint, client })
    }
}

#[async_trait]
impl ProtectionService for HttpProtectionService {
    async fn protect_data(
        &self,
        name: &str,
        data: serde_json::Value,
    ) -> Result<String, BridgeError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "name": name, "data": data }))
            .send()
            .await
            .map_err(|e| BridgeError::ProtectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::ProtectionFailed(format!(
                "HTTP {status} from protection service: {body}"
            )));
        }

        let parsed: ProtectResponse = response
            .json()
            .await
            .map_err(|e| BridgeError::ProtectionFailed(format!("invalid response: {e}")))?;
        Ok(parsed.address)
    }
}

/// Protector backed by the real confidential-compute network.
pub struct LiveProtector {
    wallet: Arc<dyn Wallet>,
    service: Arc<dyn ProtectionService>,
    required_chain_id: u64,
}

impl LiveProtector {
    pub fn new(wallet: Arc<dyn Wallet>, service: Arc<dyn ProtectionService>) -> Self {
        Self {
            wallet,
            service,
            required_chain_id: BELLECOUR.chain_id,
        }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// Point the wallet at the confidential-compute network.
    pub async fn switch_network(&self) -> Result<(), BridgeError> {
        self.wallet.switch_network(self.required_chain_id).await
    }
}

#[async_trait]
impl Protector for LiveProtector {
    async fn protect(&self, payload: &ProtectionPayload) -> Result<ProtectionReceipt, BridgeError> {
        let actual = self.wallet.chain_id().await?;
        if actual != self.required_chain_id {
            return Err(BridgeError::WrongNetwork {
                expected: self.required_chain_id,
                actual,
            });
        }

        let serialized = serde_json::to_string(payload)
            .map_err(|e| BridgeError::ProtectionFailed(e.to_string()))?;
        let data = json!({ "bridgeTransaction": serialized });
        let name = payload.dataset_name();

        let reference = self
            .service
            .protect_data(&name, data)
            .await
            .map_err(|e| match e {
                BridgeError::ProtectionFailed(message) => BridgeError::ProtectionFailed(message),
                other => BridgeError::ProtectionFailed(other.to_string()),
            })?;

        tracing::info!(dataset = %name, reference = %reference, "Transfer data protected");
        Ok(ProtectionReceipt {
            reference,
            mode: ProtectionMode::Live,
        })
    }

    fn mode(&self) -> ProtectionMode {
        ProtectionMode::Live
    }
}
