// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction record: the persisted unit of bridging work.
//!
//! ## Lifecycle
//!
//! ```text
//! Created ─┬─(private)─> Encrypting ─┐
//!          └─(public)──────────────── ┴─> Confirming ─> Bridging ─> Completed
//!
//! any non-terminal state ─> Failed
//! ```
//!
//! Stage indices are fixed per status (`Created=0 .. Completed=4`) so that
//! public transfers skip the encryption slot without changing the step count.
//! `Failed` keeps the index reached before failing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::blockchain::{format_amount, parse_amount, parse_positive_amount, ChainKey, USDC_TOKEN};
use crate::error::BridgeError;

/// Number of stages between `Created` and `Completed`.
pub const TOTAL_STAGES: u8 = 4;

/// Bridge transaction status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BridgeStatus {
    /// Record created; the user authorized the transfer
    Created,
    /// Transfer metadata is being protected in the TEE
    Encrypting,
    /// Awaiting source-chain finality
    Confirming,
    /// Cross-chain relay in progress
    Bridging,
    /// Settled on the destination chain
    Completed,
    /// Aborted by an unrecoverable error
    Failed,
}

impl BridgeStatus {
    /// Stage slot for this status. `Failed` has no slot of its own.
    pub fn stage_index(self) -> Option<u8> {
        match self {
            BridgeStatus::Created => Some(0),
            BridgeStatus::Encrypting => Some(1),
            BridgeStatus::Confirming => Some(2),
            BridgeStatus::Bridging => Some(3),
            BridgeStatus::Completed => Some(TOTAL_STAGES),
            BridgeStatus::Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BridgeStatus::Completed | BridgeStatus::Failed)
    }

    /// Whether `next` is a directed edge of the lifecycle graph.
    pub fn can_transition_to(self, next: BridgeStatus) -> bool {
        use BridgeStatus::*;
        match (self, next) {
            (Created, Encrypting) | (Created, Confirming) => true,
            (Encrypting, Confirming) => true,
            (Confirming, Bridging) => true,
            (Bridging, Completed) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl std::fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BridgeStatus::Created => "created",
            BridgeStatus::Encrypting => "encrypting",
            BridgeStatus::Confirming => "confirming",
            BridgeStatus::Bridging => "bridging",
            BridgeStatus::Completed => "completed",
            BridgeStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Why a record ended in `Failed`.
///
/// Boundary errors never reach a record directly: a protection error of any
/// kind becomes `EncryptionFailed` with the upstream message kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FailureReason {
    EncryptionFailed,
    Timeout,
}

impl FailureReason {
    /// Reason and detail recorded for an orchestration error, if it is one.
    pub fn classify(error: &BridgeError) -> Option<(Self, &str)> {
        match error {
            BridgeError::EncryptionFailed(message) => Some((Self::EncryptionFailed, message)),
            BridgeError::Timeout(message) => Some((Self::Timeout, message)),
            _ => None,
        }
    }
}

/// Which confidentiality adapter produced a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionMode {
    Live,
    Simulated,
}

/// Request to bridge USDC between two supported networks.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub source_chain: ChainKey,
    pub dest_chain: ChainKey,
    /// Human-readable USDC amount (e.g. "1000" or "12.5")
    pub amount: String,
    #[serde(default)]
    pub privacy_requested: bool,
    /// Destination address; defaults to the connected wallet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl BridgeRequest {
    /// Check chain and amount invariants.
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.source_chain == self.dest_chain {
            return Err(BridgeError::Validation(
                "Source and destination chains must differ".to_string(),
            ));
        }
        parse_positive_amount(&self.amount, USDC_TOKEN.decimals)?;
        Ok(())
    }
}

fn default_asset_symbol() -> String {
    USDC_TOKEN.symbol.to_string()
}

/// Persisted bridge transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: Uuid,
    pub source_chain: ChainKey,
    pub dest_chain: ChainKey,
    pub amount: String,
    #[serde(default = "default_asset_symbol")]
    pub asset_symbol: String,
    #[serde(default)]
    pub privacy_requested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality_mode: Option<ProtectionMode>,
    pub status: BridgeStatus,
    #[serde(default)]
    pub stage_index: u8,
    #[serde(default)]
    pub source_tx_hash: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

impl TransactionRecord {
    /// Create a record in `Created` from a validated request.
    pub fn new(request: &BridgeRequest, recipient: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            source_chain: request.source_chain,
            dest_chain: request.dest_chain,
            amount: canonical_amount(&request.amount),
            asset_symbol: default_asset_symbol(),
            privacy_requested: request.privacy_requested,
            recipient,
            confidentiality_reference: None,
            confidentiality_mode: None,
            status: BridgeStatus::Created,
            stage_index: 0,
            source_tx_hash: random_hash(),
            created_at: now,
            updated_at: Some(now),
            completed_at: None,
            failure_reason: None,
            failure_message: None,
        }
    }

    /// Closed records are immutable.
    pub fn is_closed(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.stage_index)
    }

    /// Move forward along the lifecycle graph.
    pub fn advance(&mut self, next: BridgeStatus) -> Result<(), BridgeError> {
        if next == BridgeStatus::Failed || !self.status.can_transition_to(next) {
            return Err(self.illegal(next));
        }
        match (self.status, next) {
            (BridgeStatus::Created, BridgeStatus::Encrypting) if !self.privacy_requested => {
                return Err(self.illegal(next));
            }
            (BridgeStatus::Created, BridgeStatus::Confirming) if self.privacy_requested => {
                return Err(self.illegal(next));
            }
            (BridgeStatus::Encrypting, BridgeStatus::Confirming)
                if self.confidentiality_reference.is_none() =>
            {
                return Err(self.illegal(next));
            }
            _ => {}
        }

        let now = Utc::now();
        self.status = next;
        // Every non-failed status has a slot
        self.stage_index = next.stage_index().unwrap_or(self.stage_index);
        self.updated_at = Some(now);
        if next == BridgeStatus::Completed {
            self.completed_at = Some(now);
        }
        Ok(())
    }

    /// Record the confidentiality reference. Set at most once.
    pub fn attach_protection(
        &mut self,
        reference: String,
        mode: ProtectionMode,
    ) -> Result<(), BridgeError> {
        if !self.privacy_requested
            || self.status != BridgeStatus::Encrypting
            || self.confidentiality_reference.is_some()
        {
            return Err(BridgeError::InvalidTransition(format!(
                "cannot attach a confidentiality reference to {} in status {}",
                self.id, self.status
            )));
        }
        self.confidentiality_reference = Some(reference);
        self.confidentiality_mode = Some(mode);
        self.updated_at = Some(Utc::now());
        Ok(())
    }

    /// Abort into `Failed`, keeping partial progress for diagnostics.
    pub fn fail(
        &mut self,
        reason: FailureReason,
        message: impl Into<String>,
    ) -> Result<(), BridgeError> {
        if self.is_closed() {
            return Err(self.illegal(BridgeStatus::Failed));
        }
        let now = Utc::now();
        self.status = BridgeStatus::Failed;
        self.failure_reason = Some(reason);
        self.failure_message = Some(message.into());
        self.updated_at = Some(now);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Repair fields that must agree with `status` after loading.
    ///
    /// Returns true if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;
        // Public transfers have no encryption stage to finish
        if self.status == BridgeStatus::Encrypting && !self.privacy_requested {
            self.status = BridgeStatus::Confirming;
            self.updated_at = Some(Utc::now());
            changed = true;
        }
        if let Some(index) = self.status.stage_index() {
            if self.stage_index != index {
                self.stage_index = index;
                changed = true;
            }
        } else if self.stage_index > TOTAL_STAGES {
            self.stage_index = TOTAL_STAGES;
            changed = true;
        }
        if !self.privacy_requested && self.confidentiality_reference.is_some() {
            self.confidentiality_reference = None;
            self.confidentiality_mode = None;
            changed = true;
        }
        changed
    }

    fn illegal(&self, next: BridgeStatus) -> BridgeError {
        BridgeError::InvalidTransition(format!(
            "{}: {} -> {} is not allowed",
            self.id, self.status, next
        ))
    }
}

/// `007` and `5.` are stored as `7` and `5`. Unparseable input is kept
/// trimmed; requests are validated before a record is built.
fn canonical_amount(raw: &str) -> String {
    parse_amount(raw, USDC_TOKEN.decimals)
        .map(|value| format_amount(value, USDC_TOKEN.decimals))
        .unwrap_or_else(|_| raw.trim().to_string())
}

/// Progress as a percentage of the fixed stage count, clamped to [0, 100].
pub fn progress_percent(stage_index: u8) -> u8 {
    let clamped = stage_index.min(TOTAL_STAGES) as u32;
    (100 * clamped / TOTAL_STAGES as u32) as u8
}

/// Random 32-byte value rendered as `0x` + 64 hex digits.
pub fn random_hash() -> String {
    alloy::hex::encode_prefixed(rand::random::<[u8; 32]>())
}
