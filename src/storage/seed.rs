// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Example history written on first start so a fresh deployment has
//! something to show.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::blockchain::{ChainKey, USDC_TOKEN};
use crate::bridge::record::{random_hash, BridgeStatus, ProtectionMode, TransactionRecord};

struct SeedTemplate {
    source: ChainKey,
    dest: ChainKey,
    amount: &'static str,
    private: bool,
    status: BridgeStatus,
    created_mins_ago: i64,
    completed_mins_ago: Option<i64>,
}

const SEEDS: [SeedTemplate; 3] = [
    SeedTemplate {
        source: ChainKey::ArbitrumSepolia,
        dest: ChainKey::EthereumSepolia,
        amount: "1000",
        private: true,
        status: BridgeStatus::Completed,
        created_mins_ago: 60,
        completed_mins_ago: Some(55),
    },
    SeedTemplate {
        source: ChainKey::EthereumSepolia,
        dest: ChainKey::ArbitrumSepolia,
        amount: "500",
        private: false,
        status: BridgeStatus::Completed,
        created_mins_ago: 120,
        completed_mins_ago: Some(115),
    },
    SeedTemplate {
        source: ChainKey::ArbitrumSepolia,
        dest: ChainKey::EthereumSepolia,
        amount: "2500",
        private: true,
        status: BridgeStatus::Confirming,
        created_mins_ago: 5,
        completed_mins_ago: None,
    },
];

/// Build the seed records relative to `now`, newest first.
pub fn seed_records(now: DateTime<Utc>) -> Vec<TransactionRecord> {
    let mut records: Vec<TransactionRecord> = SEEDS
        .iter()
        .map(|seed| {
            let created_at = now - Duration::minutes(seed.created_mins_ago);
            let completed_at = seed
                .completed_mins_ago
                .map(|mins| now - Duration::minutes(mins));
            let (reference, mode) = if seed.private {
                (Some(random_hash()), Some(ProtectionMode::Simulated))
            } else {
                (None, None)
            };
            TransactionRecord {
                id: Uuid::new_v4(),
                source_chain: seed.source,
                dest_chain: seed.dest,
                amount: seed.amount.to_string(),
                asset_symbol: USDC_TOKEN.symbol.to_string(),
                privacy_requested: seed.private,
                recipient: None,
                confidentiality_reference: reference,
                confidentiality_mode: mode,
                status: seed.status,
                stage_index: seed.status.stage_index().unwrap_or(0),
                source_tx_hash: random_hash(),
                created_at,
                updated_at: Some(completed_at.unwrap_or(created_at)),
                completed_at,
                failure_reason: None,
                failure_message: None,
            }
        })
        .collect();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}
