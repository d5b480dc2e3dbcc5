//! # Wallet Provider Boundary
//!
//! Trait and types for the browser-injected wallet provider, treated as an
//! opaque collaborator. The session consumes a small request surface
//! (accounts, chain id, chain switch, contract pass-through) and a push
//! event surface (accounts changed, chain changed).
//!
//! ## Injection
//!
//! In a wallet-enabled environment the host registers its provider once at
//! startup via [`register_injected`]; an empty slot is a valid, expected
//! runtime condition (no extension installed), not a programming error.
//!
//! ## Mocking
//!
//! The trait is the dependency-injection seam: tests drive the session with
//! a scripted [`mock::MockProvider`] instead of a real wallet.

use crate::chain::ChainId;
use async_channel::Receiver;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

#[cfg(test)]
pub(crate) mod mock;

/// Provider rejection code: the user declined the request.
pub const USER_REJECTED: i64 = 4001;

/// Provider rejection code: the requested chain is not registered in the
/// wallet (EIP-3326 `wallet_switchEthereumChain` failure).
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// A failed provider request, carrying the provider's numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Provider request failed (code {code}): {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The user declined a prompt.
    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED
    }

    /// The requested chain is entirely unknown to the wallet.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == UNRECOGNIZED_CHAIN
    }
}

/// Events pushed by the provider while a session is attached.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    /// The ordered list of authorized accounts changed (possibly empty).
    AccountsChanged(Vec<String>),
    /// The active chain changed.
    ChainChanged(ChainId),
}

/// An opaque contract invocation routed through the provider.
///
/// Argument encoding is owned by the provider side, mirroring how the
/// marketplace treats contract semantics as an external concern.
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    /// Contract address the call targets.
    pub to: String,
    /// Sending account, when the invocation must be authorized.
    pub from: Option<String>,
    /// Contract function name.
    pub method: String,
    /// Positional arguments as JSON values.
    pub args: Vec<Value>,
}

impl CallRequest {
    pub fn new(to: impl Into<String>, method: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            to: to.into(),
            from: None,
            method: method.into(),
            args,
        }
    }

    pub fn from_account(mut self, account: impl Into<String>) -> Self {
        self.from = Some(account.into());
        self
    }
}

/// The injected wallet provider surface consumed by the session.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Currently authorized accounts, without prompting (`eth_accounts`).
    async fn accounts(&self) -> Result<Vec<String>, ProviderRpcError>;

    /// Request account authorization; may prompt the user
    /// (`eth_requestAccounts`).
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderRpcError>;

    /// The active chain id (`eth_chainId`).
    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError>;

    /// Ask the wallet to switch to `chain`; may prompt the user. Fails with
    /// [`UNRECOGNIZED_CHAIN`] when the chain is not registered.
    async fn switch_chain(&self, chain: ChainId) -> Result<(), ProviderRpcError>;

    /// Read-only contract invocation.
    async fn call(&self, request: CallRequest) -> Result<Value, ProviderRpcError>;

    /// State-changing contract invocation; resolves to a transaction hash
    /// once the wallet has submitted it.
    async fn send_transaction(&self, request: CallRequest) -> Result<String, ProviderRpcError>;

    /// Subscribe to provider push events.
    fn subscribe(&self) -> Receiver<ProviderEvent>;
}

// Process-global slot modelling the browser's well-known injected binding.
static INJECTED: Lazy<RwLock<Option<Arc<dyn Provider>>>> = Lazy::new(|| RwLock::new(None));

/// Register the environment's injected provider (called once by the host at
/// startup, before the session is constructed).
pub fn register_injected(provider: Arc<dyn Provider>) {
    *INJECTED.write() = Some(provider);
}

/// Remove the registered provider (host shutdown).
pub fn clear_injected() {
    *INJECTED.write() = None;
}

/// The injected provider, if this environment has one.
pub fn injected() -> Option<Arc<dyn Provider>> {
    INJECTED.read().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_error_codes() {
        let declined = ProviderRpcError::new(USER_REJECTED, "user declined");
        assert!(declined.is_user_rejection());
        assert!(!declined.is_unrecognized_chain());

        let unknown = ProviderRpcError::new(UNRECOGNIZED_CHAIN, "chain not added");
        assert!(unknown.is_unrecognized_chain());
        assert_eq!(
            unknown.to_string(),
            "Provider request failed (code 4902): chain not added"
        );
    }

    #[test]
    fn test_call_request_builder() {
        let req = CallRequest::new("0xc0ffee", "retireCredit", vec![serde_json::json!(7)])
            .from_account("0xabc");
        assert_eq!(req.to, "0xc0ffee");
        assert_eq!(req.method, "retireCredit");
        assert_eq!(req.from.as_deref(), Some("0xabc"));
    }
}
