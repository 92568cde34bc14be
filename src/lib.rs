// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SolCipher Bridge - USDC Transfers Between EVM Testnets
//!
//! This crate drives bridge transfers between Arbitrum Sepolia and Ethereum
//! Sepolia through a persisted lifecycle, optionally protecting transfer
//! metadata on a confidential-compute network first.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Chain metadata, USDC reads and the wallet boundary
//! - `bridge` - Transaction records, approvals, confidentiality and the orchestrator
//! - `storage` - Transaction store and its persistence backends

pub mod api;
pub mod blockchain;
pub mod bridge;
pub mod config;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
