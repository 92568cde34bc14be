// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bridge transaction lifecycle.
//!
//! - [`record`]: the persisted transaction record and its state machine
//! - [`approval`]: ERC-20 allowance checks and approvals
//! - [`confidentiality`]: protection of transfer metadata (live or simulated)
//! - [`timing`]: stage wait policies
//! - [`orchestrator`]: drives records to a terminal state

pub mod approval;
pub mod confidentiality;
pub mod orchestrator;
pub mod record;
pub mod timing;

pub use approval::{AllowanceQuery, AllowanceStatus, ApprovalCoordinator};
pub use confidentiality::{
    HttpProtectionService, LiveProtector, ProtectionPayload, ProtectionReceipt, ProtectionService,
    Protector, SimulatedProtector,
};
pub use orchestrator::{BridgeOrchestrator, DEFAULT_STAGE_TIMEOUT};
pub use record::{
    progress_percent, BridgeRequest, BridgeStatus, FailureReason, ProtectionMode,
    TransactionRecord, TOTAL_STAGES,
};
pub use timing::{FixedStageTiming, InstantStageTiming, StageTiming};
