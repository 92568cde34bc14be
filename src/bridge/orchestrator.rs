// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Bridge Orchestrator
//!
//! Drives a [`TransactionRecord`] from `Created` to a terminal state.
//!
//! ## Discipline
//!
//! - The record is re-read from the store before every stage and after
//!   every suspension point; nothing is cached across an `.await`.
//! - Every transition is written to the store before the next stage's
//!   asynchronous work begins.
//! - At most one lifecycle runs per record id.
//! - Lifecycles run to completion. Nothing observing a record can cancel it;
//!   shutdown waits for in-flight lifecycles instead.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::task::TaskTracker;
use uuid::Uuid;

use super::confidentiality::{ProtectionPayload, Protector};
use super::record::{BridgeRequest, BridgeStatus, FailureReason, TransactionRecord};
use super::timing::StageTiming;
use crate::blockchain::{parse_address, Wallet};
use crate::error::BridgeError;
use crate::storage::TransactionStore;

/// Default upper bound for any single stage.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(60);

pub struct BridgeOrchestrator {
    store: Arc<TransactionStore>,
    protector: Arc<dyn Protector>,
    timing: Arc<dyn StageTiming>,
    wallet: Option<Arc<dyn Wallet>>,
    stage_timeout: Duration,
    in_flight: Mutex<HashSet<Uuid>>,
    tracker: TaskTracker,
}

/// Releases the per-record claim when the lifecycle ends.
struct InFlightClaim<'a> {
    in_flight: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.id);
    }
}

impl BridgeOrchestrator {
    pub fn new(
        store: Arc<TransactionStore>,
        protector: Arc<dyn Protector>,
        timing: Arc<dyn StageTiming>,
    ) -> Self {
        Self {
            store,
            protector,
            timing,
            wallet: None,
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            in_flight: Mutex::new(HashSet::new()),
            tracker: TaskTracker::new(),
        }
    }

    /// Wallet used to default the recipient of new transfers.
    pub fn with_wallet(mut self, wallet: Arc<dyn Wallet>) -> Self {
        self.wallet = Some(wallet);
        self
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<TransactionStore> {
        &self.store
    }

    pub fn protector(&self) -> &Arc<dyn Protector> {
        &self.protector
    }

    /// Create and persist a new record, then drive it in the background.
    ///
    /// Returns the `Created` record as soon as it is durable.
    pub async fn start_bridge(
        self: &Arc<Self>,
        request: BridgeRequest,
    ) -> Result<TransactionRecord, BridgeError> {
        request.validate()?;

        let recipient = match &request.recipient {
            Some(raw) => Some(parse_address(raw)?.to_string()),
            None => match &self.wallet {
                Some(wallet) => wallet.address().await.ok().map(|a| a.to_string()),
                None => None,
            },
        };

        let record = TransactionRecord::new(&request, recipient);
        self.store.put(record.clone()).await?;
        tracing::info!(
            id = %record.id,
            source = %record.source_chain,
            dest = %record.dest_chain,
            amount = %record.amount,
            private = record.privacy_requested,
            source_tx_hash = %record.source_tx_hash,
            "Bridge transaction created"
        );

        self.spawn(record.id);
        Ok(record)
    }

    /// Spawn lifecycles for every non-terminal persisted record.
    ///
    /// Returns how many were resumed.
    pub fn resume_pending(self: &Arc<Self>) -> usize {
        let pending = self.store.pending_ids();
        for id in &pending {
            tracing::info!(id = %id, "Resuming bridge transaction");
            self.spawn(*id);
        }
        pending.len()
    }

    /// Drive `id` on a tracked background task.
    pub fn spawn(self: &Arc<Self>, id: Uuid) {
        let this = Arc::clone(self);
        self.tracker.spawn(async move {
            match this.run(id).await {
                Ok(record) => {
                    tracing::debug!(id = %id, status = %record.status, "Bridge lifecycle finished");
                }
                Err(BridgeError::AlreadyInFlight(_)) => {
                    tracing::debug!(id = %id, "Bridge lifecycle already running");
                }
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "Bridge lifecycle aborted");
                }
            }
        });
    }

    /// Wait for every spawned lifecycle to reach a terminal state.
    pub async fn shutdown(&self) {
        self.tracker.close();
        tracing::info!(in_flight = self.tracker.len(), "Waiting for bridge lifecycles");
        self.tracker.wait().await;
    }

    /// Number of lifecycles currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Drive a record from its persisted state to a terminal state.
    ///
    /// A storage failure aborts the run, leaving the last persisted state in
    /// place for a later resume.
    pub async fn run(&self, id: Uuid) -> Result<TransactionRecord, BridgeError> {
        let _claim = self.claim(id)?;

        loop {
            let record = self.load(id)?;
            match record.status {
                BridgeStatus::Completed | BridgeStatus::Failed => return Ok(record),
                BridgeStatus::Created if record.privacy_requested => {
                    self.advance(record, BridgeStatus::Encrypting).await?;
                }
                BridgeStatus::Created => {
                    self.timed_advance(record, BridgeStatus::Confirming).await?;
                }
                BridgeStatus::Encrypting if record.confidentiality_reference.is_none() => {
                    self.protect(record).await?;
                }
                BridgeStatus::Encrypting => {
                    self.timed_advance(record, BridgeStatus::Confirming).await?;
                }
                BridgeStatus::Confirming => {
                    self.timed_advance(record, BridgeStatus::Bridging).await?;
                }
                BridgeStatus::Bridging => {
                    self.timed_advance(record, BridgeStatus::Completed).await?;
                }
            }
        }
    }

    fn claim(&self, id: Uuid) -> Result<InFlightClaim<'_>, BridgeError> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(id) {
            return Err(BridgeError::AlreadyInFlight(id.to_string()));
        }
        Ok(InFlightClaim {
            in_flight: &self.in_flight,
            id,
        })
    }

    fn load(&self, id: Uuid) -> Result<TransactionRecord, BridgeError> {
        self.store
            .get(id)
            .ok_or_else(|| BridgeError::NotFound(id.to_string()))
    }

    /// Apply and persist an immediate transition.
    async fn advance(
        &self,
        mut record: TransactionRecord,
        next: BridgeStatus,
    ) -> Result<(), BridgeError> {
        let from = record.status;
        record.advance(next)?;
        self.commit(record, from).await
    }

    /// Wait for the stage policy, then re-read and transition.
    async fn timed_advance(
        &self,
        record: TransactionRecord,
        next: BridgeStatus,
    ) -> Result<(), BridgeError> {
        let from = record.status;
        let waited = tokio::time::timeout(self.stage_timeout, self.timing.await_stage(&record, next)).await;
        if waited.is_err() {
            let cause = BridgeError::Timeout(format!(
                "{next} stage exceeded {} ms",
                self.stage_timeout.as_millis()
            ));
            return self.fail(record.id, cause).await;
        }

        let fresh = self.load(record.id)?;
        if fresh.status != from {
            // Moved while we were suspended; re-evaluate from the new state
            return Ok(());
        }
        self.advance(fresh, next).await
    }

    /// Protect transfer metadata and attach the reference.
    async fn protect(&self, record: TransactionRecord) -> Result<(), BridgeError> {
        let payload = ProtectionPayload::for_record(&record);
        let outcome = tokio::time::timeout(self.stage_timeout, self.protector.protect(&payload)).await;

        let receipt = match outcome {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                tracing::warn!(id = %record.id, error = %e, "Data protection failed");
                let cause = BridgeError::EncryptionFailed(e.to_string());
                return self.fail(record.id, cause).await;
            }
            Err(_) => {
                let cause = BridgeError::Timeout(format!(
                    "data protection exceeded {} ms",
                    self.stage_timeout.as_millis()
                ));
                return self.fail(record.id, cause).await;
            }
        };

        let mut fresh = self.load(record.id)?;
        if fresh.status != BridgeStatus::Encrypting || fresh.confidentiality_reference.is_some() {
            return Ok(());
        }
        fresh.attach_protection(receipt.reference, receipt.mode)?;
        self.store.put(fresh.clone()).await?;
        tracing::info!(
            id = %fresh.id,
            mode = ?receipt.mode,
            reference = fresh.confidentiality_reference.as_deref().unwrap_or_default(),
            "Confidentiality reference attached"
        );
        Ok(())
    }

    /// Move `id` to `Failed`, recording the reason derived from `cause`.
    ///
    /// Errors other than `EncryptionFailed` and `Timeout` are returned as-is.
    async fn fail(&self, id: Uuid, cause: BridgeError) -> Result<(), BridgeError> {
        let (reason, message) = match FailureReason::classify(&cause) {
            Some((reason, message)) => (reason, message.to_string()),
            None => return Err(cause),
        };
        let mut record = self.load(id)?;
        let from = record.status;
        record.fail(reason, message)?;
        tracing::warn!(
            id = %id,
            from = %from,
            reason = ?reason,
            message = record.failure_message.as_deref().unwrap_or_default(),
            stage = record.stage_index,
            "Bridge transaction failed"
        );
        self.store.put(record).await?;
        Ok(())
    }

    async fn commit(&self, record: TransactionRecord, from: BridgeStatus) -> Result<(), BridgeError> {
        let (id, to, stage, progress) = (
            record.id,
            record.status,
            record.stage_index,
            record.progress_percent(),
        );
        self.store.put(record).await?;
        tracing::info!(id = %id, from = %from, to = %to, stage, progress, "Bridge transition");
        Ok(())
    }
}
