// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stage timing policies.
//!
//! Confirmation and relay are not observed on-chain; each stage instead
//! advances after the wait returned by the active policy.

use std::time::Duration;

use async_trait::async_trait;

use super::record::{BridgeStatus, TransactionRecord};

/// Decides how long the orchestrator waits before entering a stage.
#[async_trait]
pub trait StageTiming: Send + Sync {
    /// Resolve once `record` may advance into `next`.
    async fn await_stage(&self, record: &TransactionRecord, next: BridgeStatus);
}

/// Fixed per-stage delays.
#[derive(Debug, Clone)]
pub struct FixedStageTiming {
    pub confirming: Duration,
    pub bridging: Duration,
    pub completed: Duration,
}

impl Default for FixedStageTiming {
    fn default() -> Self {
        Self {
            confirming: Duration::from_millis(2000),
            bridging: Duration::from_millis(3000),
            completed: Duration::from_millis(1500),
        }
    }
}

impl FixedStageTiming {
    pub fn delay_for(&self, next: BridgeStatus) -> Duration {
        match next {
            BridgeStatus::Confirming => self.confirming,
            BridgeStatus::Bridging => self.bridging,
            BridgeStatus::Completed => self.completed,
            _ => Duration::ZERO,
        }
    }
}

#[async_trait]
impl StageTiming for FixedStageTiming {
    async fn await_stage(&self, record: &TransactionRecord, next: BridgeStatus) {
        let delay = self.delay_for(next);
        tracing::debug!(id = %record.id, stage = %next, delay_ms = delay.as_millis() as u64, "Waiting for stage");
        tokio::time::sleep(delay).await;
    }
}

/// No waiting at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantStageTiming;

#[async_trait]
impl StageTiming for InstantStageTiming {
    async fn await_stage(&self, _: &TransactionRecord, _: BridgeStatus) {}
}
