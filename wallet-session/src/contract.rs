//! # GHC Credit Contract Capability
//!
//! Contract-interaction handle bound to a [`Signer`] and the marketplace's
//! on-chain credit registry. The interface definition ships with the crate
//! and is parsed once at session construction; calls are validated against
//! it and then passed through to the provider, which owns encoding and all
//! contract semantics.
//!
//! Typed wrappers cover the marketplace surface: balance lookup, per-index
//! token lookup, credit detail lookup, and credit retirement.

use crate::provider::{CallRequest, ProviderRpcError};
use crate::signer::Signer;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Interface definition for the GHC credit registry contract.
pub const GHC_CREDIT_ABI: &str = include_str!("../abi/ghc_credit.json");

/// Contract interaction errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The function is not part of the contract interface.
    #[error("Unknown contract function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments for a known function.
    #[error("Function {name} takes {expected} argument(s), got {got}")]
    BadArity {
        name: String,
        expected: usize,
        got: usize,
    },

    /// The provider rejected or failed the invocation.
    #[error(transparent)]
    Rpc(#[from] ProviderRpcError),

    /// The provider returned a value the wrapper could not decode.
    #[error("Failed to decode contract response: {0}")]
    Decode(String),
}

/// One parameter of a contract function.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One entry of the interface definition (functions and events).
#[derive(Debug, Clone, Deserialize)]
struct AbiEntry {
    #[serde(rename = "type")]
    kind: String,
    name: String,
    #[serde(default)]
    inputs: Vec<AbiParam>,
    #[serde(default)]
    outputs: Vec<AbiParam>,
}

/// A callable contract function.
#[derive(Debug, Clone)]
pub struct AbiFunction {
    pub name: String,
    pub inputs: Vec<AbiParam>,
    pub outputs: Vec<AbiParam>,
}

/// Parsed contract interface, indexed by function name.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    functions: HashMap<String, AbiFunction>,
}

impl ContractInterface {
    /// Parse an interface definition from its JSON form.
    pub fn parse(abi_json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<AbiEntry> = serde_json::from_str(abi_json)?;
        let functions = entries
            .into_iter()
            .filter(|e| e.kind == "function")
            .map(|e| {
                (
                    e.name.clone(),
                    AbiFunction {
                        name: e.name,
                        inputs: e.inputs,
                        outputs: e.outputs,
                    },
                )
            })
            .collect();
        Ok(Self { functions })
    }

    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.get(name)
    }

    /// Validate a call against the interface before dispatch.
    fn check(&self, name: &str, args: &[Value]) -> Result<(), ContractError> {
        let function = self
            .function(name)
            .ok_or_else(|| ContractError::UnknownFunction(name.to_string()))?;
        if function.inputs.len() != args.len() {
            return Err(ContractError::BadArity {
                name: name.to_string(),
                expected: function.inputs.len(),
                got: args.len(),
            });
        }
        Ok(())
    }
}

/// Details of one green hydrogen credit token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDetails {
    /// Producer account the credit was minted for.
    pub producer: String,
    /// Energy source backing the credit (solar, wind, hydro).
    pub energy_source: String,
    /// Production date as a unix timestamp.
    pub production_date: i64,
    /// Whether the credit has been retired to claim its benefit.
    pub is_retired: bool,
}

/// Contract-interaction capability bound to a signer.
///
/// Constructed by the session once, and only once, connected to the
/// required network; consumers receive it read-only through the published
/// session state.
#[derive(Clone)]
pub struct ContractHandle {
    address: String,
    interface: Arc<ContractInterface>,
    signer: Signer,
}

impl ContractHandle {
    pub(crate) fn new(address: String, interface: Arc<ContractInterface>, signer: Signer) -> Self {
        Self {
            address,
            interface,
            signer,
        }
    }

    /// The on-chain address this handle is bound to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// The signer backing state-changing invocations.
    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Read-only invocation, validated against the interface.
    pub async fn call(&self, method: &str, args: Vec<Value>) -> Result<Value, ContractError> {
        self.interface.check(method, &args)?;
        let request = CallRequest::new(self.address.clone(), method, args);
        Ok(self.signer.provider().call(request).await?)
    }

    /// State-changing invocation, validated against the interface and
    /// authorized by the bound signer. Resolves to the transaction hash.
    pub async fn submit(&self, method: &str, args: Vec<Value>) -> Result<String, ContractError> {
        self.interface.check(method, &args)?;
        let request = CallRequest::new(self.address.clone(), method, args);
        Ok(self.signer.send_transaction(request).await?)
    }

    /// Number of credits held by `owner`.
    pub async fn balance_of(&self, owner: &str) -> Result<u64, ContractError> {
        let value = self.call("balanceOf", vec![json!(owner)]).await?;
        decode_u64(&value)
    }

    /// Token id at `index` within `owner`'s holdings.
    pub async fn token_of_owner_by_index(
        &self,
        owner: &str,
        index: u64,
    ) -> Result<u64, ContractError> {
        let value = self
            .call("tokenOfOwnerByIndex", vec![json!(owner), json!(index)])
            .await?;
        decode_u64(&value)
    }

    /// Full details of one credit token.
    pub async fn credit_details(&self, token_id: u64) -> Result<CreditDetails, ContractError> {
        let value = self.call("creditDetails", vec![json!(token_id)]).await?;
        serde_json::from_value(value).map_err(|e| ContractError::Decode(e.to_string()))
    }

    /// Retire a credit to claim its environmental benefit. Returns the
    /// transaction hash; confirmation tracking is owned by the caller.
    pub async fn retire_credit(&self, token_id: u64) -> Result<String, ContractError> {
        self.submit("retireCredit", vec![json!(token_id)]).await
    }
}

impl fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractHandle")
            .field("address", &self.address)
            .field("signer", &self.signer)
            .finish()
    }
}

impl PartialEq for ContractHandle {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.signer == other.signer
    }
}

fn decode_u64(value: &Value) -> Result<u64, ContractError> {
    value
        .as_u64()
        .ok_or_else(|| ContractError::Decode(format!("expected unsigned integer, got {value}")))
}
