//! # Chain Identifiers
//!
//! Newtype for EVM chain identifiers. Wallet providers report the active
//! chain as a hex string (`"0xaa36a7"`), while configuration and logs use
//! the decimal form (11155111), so both representations are supported.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Sepolia test network, the required network for the GHC marketplace.
pub const SEPOLIA: ChainId = ChainId(11_155_111);

/// A blockchain network identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

/// Error parsing a chain identifier from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid chain id '{0}': expected a decimal or 0x-prefixed hex number")]
pub struct ChainIdParseError(pub String);

impl ChainId {
    /// Render as the 0x-prefixed hex form used on the provider wire.
    pub fn as_hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parse from the 0x-prefixed hex form used on the provider wire.
    pub fn from_hex(s: &str) -> Result<Self, ChainIdParseError> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ChainIdParseError(s.to_string()))?;
        u64::from_str_radix(digits, 16)
            .map(ChainId)
            .map_err(|_| ChainIdParseError(s.to_string()))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ChainIdParseError;

    /// Accepts both decimal ("11155111") and hex ("0xaa36a7") forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with("0x") || s.starts_with("0X") {
            ChainId::from_hex(s)
        } else {
            s.parse::<u64>()
                .map(ChainId)
                .map_err(|_| ChainIdParseError(s.to_string()))
        }
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        ChainId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sepolia_hex_round_trip() {
        assert_eq!(SEPOLIA.as_hex(), "0xaa36a7");
        assert_eq!(ChainId::from_hex("0xaa36a7"), Ok(SEPOLIA));
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!("11155111".parse::<ChainId>(), Ok(SEPOLIA));
        assert_eq!("0xaa36a7".parse::<ChainId>(), Ok(SEPOLIA));
        assert_eq!("0XAA36A7".parse::<ChainId>(), Ok(SEPOLIA));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<ChainId>().is_err());
        assert!("0x".parse::<ChainId>().is_err());
        assert!("sepolia".parse::<ChainId>().is_err());
        assert!("0xzz".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(SEPOLIA.to_string(), "0xaa36a7");
        assert_eq!(ChainId(1).to_string(), "0x1");
    }
}
