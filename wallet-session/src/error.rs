//! # Session Error Types
//!
//! Consolidated error taxonomy for the wallet session.
//!
//! Every variant is user-actionable and is surfaced through the published
//! [`SessionState::error`](crate::session::SessionState) field rather than
//! returned or thrown across the public contract. Consumers observe the
//! field; they never need structured exception handling.
//!
//! ## Error Categories
//!
//! - **ProviderNotFound**: no injected wallet provider in this environment
//! - **WrongNetwork**: active chain differs from the required chain and the
//!   automatic switch request failed or was declined
//! - **UnknownNetwork**: the required chain is not registered in the wallet
//!   at all (distinguished by the provider's rejection code)
//! - **ConnectionRequest**: the account-authorization request failed or was
//!   declined by the user
//! - **Query**: a non-interactive status query (accounts, chain id) failed;
//!   non-fatal, previous capability state is preserved
//!
//! Nothing here is fatal to the process. The worst outcome is a session
//! stuck disconnected with a descriptive error, recoverable by a fresh
//! `connect()` call.

use crate::chain::ChainId;
use thiserror::Error;

/// Last actionable session failure, published as state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No injected wallet provider detected in this environment.
    #[error("Wallet not detected. Please install a wallet extension.")]
    ProviderNotFound,

    /// The active chain differs from the required chain and the automatic
    /// switch request failed or was declined.
    #[error("Incorrect network. Please switch to chain {required} manually in your wallet.")]
    WrongNetwork { required: ChainId },

    /// The required chain is not registered in the wallet at all.
    #[error("Network {required} not found in your wallet. Please add it manually.")]
    UnknownNetwork { required: ChainId },

    /// The account-authorization request failed or was declined.
    #[error("Failed to connect wallet: {0}. Please retry.")]
    ConnectionRequest(String),

    /// A non-interactive status query failed unexpectedly.
    #[error("Wallet status query failed: {0}")]
    Query(String),
}

impl SessionError {
    /// Whether this error came from network enforcement (wrong or unknown
    /// chain) rather than from a request failure.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            SessionError::WrongNetwork { .. } | SessionError::UnknownNetwork { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::SEPOLIA;

    #[test]
    fn test_messages_are_actionable() {
        let err = SessionError::WrongNetwork { required: SEPOLIA };
        assert_eq!(
            err.to_string(),
            "Incorrect network. Please switch to chain 0xaa36a7 manually in your wallet."
        );
        assert!(SessionError::ProviderNotFound.to_string().contains("install"));
        assert!(SessionError::UnknownNetwork { required: SEPOLIA }
            .to_string()
            .contains("add it manually"));
    }

    #[test]
    fn test_network_error_classification() {
        assert!(SessionError::WrongNetwork { required: SEPOLIA }.is_network_error());
        assert!(SessionError::UnknownNetwork { required: SEPOLIA }.is_network_error());
        assert!(!SessionError::ProviderNotFound.is_network_error());
        assert!(!SessionError::ConnectionRequest("declined".into()).is_network_error());
    }
}
