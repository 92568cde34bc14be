// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Loading the bridge wallet's signing key.
//!
//! The key file holds either a PEM-encoded secp256k1 private key (SEC1 or
//! PKCS#8) or a raw hex string with an optional `0x` prefix.

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use k256::SecretKey;

use crate::error::BridgeError;

fn invalid_key(detail: impl std::fmt::Display) -> BridgeError {
    BridgeError::Validation(format!("Invalid private key: {detail}"))
}

/// Parse a private key from PEM format to hex string.
pub fn pem_to_hex(pem_bytes: &[u8]) -> Result<String, BridgeError> {
    let pem_str = std::str::from_utf8(pem_bytes).map_err(invalid_key)?;
    let pem = pem::parse(pem_str).map_err(invalid_key)?;

    let secret_key = SecretKey::from_sec1_der(pem.contents())
        .or_else(|_| parse_pkcs8_to_secret_key(pem.contents()))
        .map_err(invalid_key)?;

    Ok(alloy::hex::encode(secret_key.to_bytes()))
}

/// Parse PKCS#8 DER to extract the secret key.
fn parse_pkcs8_to_secret_key(der: &[u8]) -> Result<SecretKey, String> {
    use k256::pkcs8::DecodePrivateKey;
    SecretKey::from_pkcs8_der(der).map_err(|e| e.to_string())
}

/// Create a signer from a hex-encoded key (with or without `0x`).
pub fn signer_from_hex(private_key_hex: &str) -> Result<PrivateKeySigner, BridgeError> {
    let trimmed = private_key_hex.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let key_bytes = alloy::hex::decode(hex).map_err(invalid_key)?;
    PrivateKeySigner::from_slice(&key_bytes).map_err(invalid_key)
}

/// Create a signer from PEM-encoded private key bytes.
pub fn signer_from_pem(pem_bytes: &[u8]) -> Result<PrivateKeySigner, BridgeError> {
    let hex_key = pem_to_hex(pem_bytes)?;
    signer_from_hex(&hex_key)
}

/// Load a signer from a key file, detecting PEM vs hex content.
pub fn load_signer(path: impl AsRef<Path>) -> Result<PrivateKeySigner, BridgeError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| invalid_key(format!("cannot read {}: {e}", path.display())))?;

    if bytes.windows(10).any(|w| w == b"-----BEGIN") {
        signer_from_pem(&bytes)
    } else {
        let text = std::str::from_utf8(&bytes).map_err(invalid_key)?;
        signer_from_hex(text)
    }
}
