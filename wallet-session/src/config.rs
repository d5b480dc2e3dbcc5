//! # Session Configuration
//!
//! Static configuration for the wallet session: the single required network
//! and the credit registry contract it targets. Defaults are compile-time
//! constants matching the marketplace's staging deployment; environment
//! variables override them for other deployments and are validated on
//! startup to fail fast if misconfigured.
//!
//! ## Global Config Access
//!
//! Use [`session_config()`] to access the global configuration instance
//! after a single [`init_config()`] call at application startup. Tests and
//! embedded uses can instead pass a [`SessionConfig`] value directly to the
//! session constructor.

use crate::chain::{ChainId, SEPOLIA};
use once_cell::sync::OnceCell;
use std::env;

/// Credit registry address on the staging deployment.
pub const GHC_CONTRACT_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// Wallet session configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// The single network this application operates against. Any other
    /// active network is a mismatch.
    pub required_chain: ChainId,

    /// On-chain address of the GHC credit registry contract.
    pub contract_address: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            required_chain: SEPOLIA,
            contract_address: GHC_CONTRACT_ADDRESS.to_string(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables, falling back to the
    /// staging defaults.
    ///
    /// - `GHC_CHAIN_ID`: required chain, decimal or 0x-prefixed hex
    /// - `GHC_CONTRACT_ADDRESS`: credit registry address
    pub fn from_env() -> Result<Self, String> {
        let required_chain = match env::var("GHC_CHAIN_ID") {
            Ok(raw) => raw
                .parse::<ChainId>()
                .map_err(|e| format!("GHC_CHAIN_ID: {e}"))?,
            Err(_) => SEPOLIA,
        };

        let contract_address =
            env::var("GHC_CONTRACT_ADDRESS").unwrap_or_else(|_| GHC_CONTRACT_ADDRESS.to_string());

        Ok(Self {
            required_chain,
            contract_address,
        })
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.required_chain.0 == 0 {
            return Err("GHC_CHAIN_ID must be a nonzero chain id".to_string());
        }

        let addr = &self.contract_address;
        let hex = addr.strip_prefix("0x").unwrap_or("");
        if hex.len() != 40 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!(
                "GHC_CONTRACT_ADDRESS must be a 0x-prefixed 20-byte hex address, got '{addr}'"
            ));
        }

        Ok(())
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceCell<SessionConfig> = OnceCell::new();

/// Initialize the global configuration from the environment.
///
/// Call once at application startup, before the session is constructed.
/// Returns an error if the environment is invalid or the config was
/// already initialized.
pub fn init_config() -> Result<(), String> {
    let config = SessionConfig::from_env()?;
    config.validate()?;

    CONFIG
        .set(config)
        .map_err(|_| "Session config has already been initialized".to_string())
}

/// Get a reference to the global configuration.
///
/// # Panics
///
/// Panics if [`init_config()`] has not been called yet.
pub fn session_config() -> &'static SessionConfig {
    CONFIG
        .get()
        .expect("Session config must be initialized with init_config() before use")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_sepolia() {
        let config = SessionConfig::default();
        assert_eq!(config.required_chain, SEPOLIA);
        assert_eq!(config.contract_address, GHC_CONTRACT_ADDRESS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_chain() {
        let config = SessionConfig {
            required_chain: ChainId(0),
            ..SessionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_malformed_address() {
        for addr in ["", "0x123", "5fbdb2315678afecb367f032d93f642f64180aa3", "0xnothex"] {
            let config = SessionConfig {
                contract_address: addr.to_string(),
                ..SessionConfig::default()
            };
            assert!(config.validate().is_err(), "accepted '{addr}'");
        }
    }
}
