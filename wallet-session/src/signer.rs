//! # Signer Capability
//!
//! A signing capability bound to one authorized account on one chain.
//! The session derives a signer only once connected on the required chain,
//! so holding a `Signer` implies a valid session at derivation time.

use crate::chain::ChainId;
use crate::provider::{CallRequest, Provider, ProviderRpcError};
use std::fmt;
use std::sync::Arc;

/// Capability to authorize transactions from one account.
#[derive(Clone)]
pub struct Signer {
    address: String,
    chain: ChainId,
    provider: Arc<dyn Provider>,
}

impl Signer {
    pub(crate) fn new(address: String, chain: ChainId, provider: Arc<dyn Provider>) -> Self {
        Self {
            address,
            chain,
            provider,
        }
    }

    /// The account this signer is bound to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The chain this signer was derived on.
    pub fn chain(&self) -> ChainId {
        self.chain
    }

    pub(crate) fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Submit a state-changing invocation authorized by this account.
    ///
    /// The wallet may prompt the user; resolves to the transaction hash
    /// once submitted.
    pub async fn send_transaction(
        &self,
        request: CallRequest,
    ) -> Result<String, ProviderRpcError> {
        let request = request.from_account(self.address.clone());
        self.provider.send_transaction(request).await
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address)
            .field("chain", &self.chain)
            .finish()
    }
}

// Capability identity is the (account, chain) binding; the provider handle
// behind it is not observable.
impl PartialEq for Signer {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.chain == other.chain
    }
}
