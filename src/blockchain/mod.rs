// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for the bridged EVM testnets.
//!
//! This module provides:
//! - Chain and token metadata
//! - USDC balance and allowance reads (with documented fallbacks)
//! - The wallet boundary used to submit approvals and switch networks

pub mod balance;
pub mod client;
pub mod erc20;
pub mod signing;
pub mod types;
pub mod units;
pub mod wallet;

pub use balance::{BalanceReader, DEFAULT_BALANCE_TTL};
pub use client::{ChainReader, EvmChainReader, DEFAULT_CHAIN_READ_TIMEOUT};
pub use erc20::{approve_calldata, parse_address};
pub use signing::load_signer;
pub use types::*;
pub use units::{format_amount, format_display, parse_amount, parse_positive_amount};
pub use wallet::{DetachedWallet, SignerWallet, Wallet};
