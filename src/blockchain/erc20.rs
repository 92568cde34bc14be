// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use std::str::FromStr;

use alloy::{
    primitives::{Address, Bytes, U256},
    providers::Provider,
    sol,
    sol_types::SolCall,
};

use crate::error::BridgeError;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Create a new ERC-20 contract instance.
    pub fn new(provider: &P, contract_address: &str) -> Result<Self, BridgeError> {
        let address = parse_address(contract_address)?;
        let contract = IERC20::new(address, provider.clone());
        Ok(Self { contract })
    }

    /// Raw balance of an account in base units.
    pub async fn balance_of(&self, owner: Address) -> Result<U256, BridgeError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| BridgeError::NetworkError(format!("balanceOf failed: {e}")))
    }

    /// Amount `spender` may move on behalf of `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, BridgeError> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| BridgeError::NetworkError(format!("allowance failed: {e}")))
    }
}

/// ABI-encoded `approve(spender, amount)` call data.
pub fn approve_calldata(spender: Address, amount: U256) -> Bytes {
    IERC20::approveCall { spender, amount }.abi_encode().into()
}

/// Parse a 0x-prefixed hex address.
pub fn parse_address(raw: &str) -> Result<Address, BridgeError> {
    Address::from_str(raw.trim())
        .map_err(|e| BridgeError::Validation(format!("Invalid address `{raw}`: {e}")))
}
