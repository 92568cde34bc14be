// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Conversion between human-readable decimal amounts and token base units.

use alloy::primitives::U256;

use crate::error::BridgeError;

/// Parse a human-readable amount to token base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (6 for USDC)
///
/// # Returns
/// * `Ok(U256)` - Amount in smallest unit
/// * `Err(BridgeError::Validation)` - If parsing fails
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, BridgeError> {
    let amount = amount.trim();
    let parts: Vec<&str> = amount.split('.').collect();

    if amount.is_empty() || parts.len() > 2 {
        return Err(BridgeError::Validation(format!(
            "Invalid amount format: `{amount}`"
        )));
    }

    let whole = if parts[0].is_empty() && parts.len() == 2 {
        0u128
    } else {
        // u128::from_str accepts a leading `+`
        if !parts[0].chars().all(|c| c.is_ascii_digit()) {
            return Err(BridgeError::Validation("Invalid whole number".to_string()));
        }
        parts[0]
            .parse::<u128>()
            .map_err(|_| BridgeError::Validation("Invalid whole number".to_string()))?
    };

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(BridgeError::Validation(format!(
                "Too many decimal places (max {decimals})"
            )));
        }
        if dec_str.is_empty() {
            0u128
        } else {
            if !dec_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(BridgeError::Validation("Invalid decimal".to_string()));
            }
            // Pad with zeros to match decimals
            let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
            padded
                .parse::<u128>()
                .map_err(|_| BridgeError::Validation("Invalid decimal".to_string()))?
        }
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| BridgeError::Validation("Amount overflow".to_string()))?;

    Ok(U256::from(total))
}

/// Parse an amount and require it to be strictly positive.
pub fn parse_positive_amount(amount: &str, decimals: u8) -> Result<U256, BridgeError> {
    let value = parse_amount(amount, decimals)?;
    if value.is_zero() {
        return Err(BridgeError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Format base units to a human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

/// Format base units with exactly two fractional digits (truncating).
pub fn format_display(amount: U256, decimals: u8) -> String {
    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let cents = if decimals >= 2 {
        (amount % divisor) / U256::from(10u64).pow(U256::from(decimals - 2))
    } else {
        (amount % divisor) * U256::from(10u64).pow(U256::from(2 - decimals))
    };
    format!("{whole}.{:0>2}", cents.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_amount_whole() {
        assert_eq!(parse_amount("1000", 6).unwrap(), U256::from(1_000_000_000u64));
    }

    #[test]
    fn parse_amount_decimal() {
        // 1.5 USDC = 1_500_000 (6 decimals)
        assert_eq!(parse_amount("1.5", 6).unwrap(), U256::from(1_500_000u64));
        assert_eq!(parse_amount(".25", 6).unwrap(), U256::from(250_000u64));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("", 6).is_err());
        assert!(parse_amount("abc", 6).is_err());
        assert!(parse_amount("1.2.3", 6).is_err());
        assert!(parse_amount("-5", 6).is_err());
        assert!(parse_amount("1.1234567", 6).is_err());
        assert!(parse_amount("1.+5", 6).is_err());
        assert!(parse_amount("+5", 6).is_err());
        assert!(parse_amount("+.5", 6).is_err());
    }

    #[test]
    fn leading_zeros_and_bare_point_parse() {
        assert_eq!(parse_amount("007", 6).unwrap(), U256::from(7_000_000u64));
        assert_eq!(parse_amount("5.", 6).unwrap(), U256::from(5_000_000u64));
    }

    #[test]
    fn positive_amount_rejects_zero() {
        assert!(matches!(
            parse_positive_amount("0", 6),
            Err(BridgeError::Validation(_))
        ));
        assert!(parse_positive_amount("0.000", 6).is_err());
        assert!(parse_positive_amount("0.000001", 6).is_ok());
    }

    #[test]
    fn format_amount_trims_trailing_zeros() {
        assert_eq!(format_amount(U256::from(1_000_000u64), 6), "1");
        assert_eq!(format_amount(U256::from(1_500_000u64), 6), "1.5");
        assert_eq!(format_amount(U256::ZERO, 6), "0");
    }

    #[test]
    fn format_display_uses_two_decimals() {
        assert_eq!(format_display(U256::from(5_000_000_000u64), 6), "5000.00");
        assert_eq!(format_display(U256::from(1_234_567u64), 6), "1.23");
        assert_eq!(format_display(U256::ZERO, 6), "0.00");
    }
}
