//! Scripted provider for session tests.
//!
//! Behavior is configured up front (active chain, registered chains,
//! authorized accounts, declined prompts) and the session under test is
//! driven against it; request counters let tests assert ordering, e.g.
//! that no authorization prompt happens after a failed chain switch.

use super::{
    CallRequest, Provider, ProviderEvent, ProviderRpcError, UNRECOGNIZED_CHAIN, USER_REJECTED,
};
use crate::chain::ChainId;
use async_channel::{unbounded, Receiver, Sender};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

struct MockInner {
    chain: ChainId,
    known_chains: Vec<ChainId>,
    /// Accounts returned by the non-interactive `accounts()` query.
    silent_accounts: Vec<String>,
    /// Accounts granted when the user approves `request_accounts()`.
    authorized_accounts: Vec<String>,
    decline_request_accounts: bool,
    decline_switch: bool,
    fail_accounts_query: bool,
    fail_chain_query: bool,
    call_results: HashMap<String, Value>,
    submitted: Vec<CallRequest>,
    switch_requests: u64,
    authorization_requests: u64,
}

pub struct MockProvider {
    inner: Mutex<MockInner>,
    /// When set, `request_accounts()` parks until the test releases it,
    /// simulating a slow in-flight authorization prompt.
    authorization_gate: Mutex<Option<Arc<Notify>>>,
    events_tx: Sender<ProviderEvent>,
    events_rx: Receiver<ProviderEvent>,
}

impl MockProvider {
    pub fn new(chain: ChainId) -> Arc<Self> {
        let (events_tx, events_rx) = unbounded();
        Arc::new(Self {
            inner: Mutex::new(MockInner {
                chain,
                known_chains: vec![chain],
                silent_accounts: Vec::new(),
                authorized_accounts: Vec::new(),
                decline_request_accounts: false,
                decline_switch: false,
                fail_accounts_query: false,
                fail_chain_query: false,
                call_results: HashMap::new(),
                submitted: Vec::new(),
                switch_requests: 0,
                authorization_requests: 0,
            }),
            authorization_gate: Mutex::new(None),
            events_tx,
            events_rx,
        })
    }

    pub fn set_chain(&self, chain: ChainId) {
        self.inner.lock().chain = chain;
    }

    pub fn register_chain(&self, chain: ChainId) {
        self.inner.lock().known_chains.push(chain);
    }

    pub fn set_silent_accounts(&self, accounts: Vec<&str>) {
        self.inner.lock().silent_accounts = accounts.into_iter().map(String::from).collect();
    }

    pub fn set_authorized_accounts(&self, accounts: Vec<&str>) {
        self.inner.lock().authorized_accounts = accounts.into_iter().map(String::from).collect();
    }

    pub fn decline_request_accounts(&self, decline: bool) {
        self.inner.lock().decline_request_accounts = decline;
    }

    pub fn decline_switch(&self, decline: bool) {
        self.inner.lock().decline_switch = decline;
    }

    pub fn fail_accounts_query(&self, fail: bool) {
        self.inner.lock().fail_accounts_query = fail;
    }

    pub fn fail_chain_query(&self, fail: bool) {
        self.inner.lock().fail_chain_query = fail;
    }

    pub fn set_call_result(&self, method: &str, result: Value) {
        self.inner.lock().call_results.insert(method.to_string(), result);
    }

    pub fn submitted(&self) -> Vec<CallRequest> {
        self.inner.lock().submitted.clone()
    }

    pub fn switch_requests(&self) -> u64 {
        self.inner.lock().switch_requests
    }

    pub fn authorization_requests(&self) -> u64 {
        self.inner.lock().authorization_requests
    }

    /// Install a gate that parks the next `request_accounts()` call until
    /// the returned handle is notified.
    pub fn gate_authorization(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.authorization_gate.lock() = Some(Arc::clone(&gate));
        gate
    }

    pub fn fire_accounts_changed(&self, accounts: Vec<&str>) {
        self.events_tx
            .try_send(ProviderEvent::AccountsChanged(
                accounts.into_iter().map(String::from).collect(),
            ))
            .expect("event channel open");
    }

    pub fn fire_chain_changed(&self, chain: ChainId) {
        self.events_tx
            .try_send(ProviderEvent::ChainChanged(chain))
            .expect("event channel open");
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderRpcError> {
        let inner = self.inner.lock();
        if inner.fail_accounts_query {
            return Err(ProviderRpcError::new(-32603, "internal provider error"));
        }
        Ok(inner.silent_accounts.clone())
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ProviderRpcError> {
        let gate = {
            let mut inner = self.inner.lock();
            inner.authorization_requests += 1;
            self.authorization_gate.lock().take()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let inner = self.inner.lock();
        if inner.decline_request_accounts {
            return Err(ProviderRpcError::new(USER_REJECTED, "user rejected the request"));
        }
        Ok(inner.authorized_accounts.clone())
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderRpcError> {
        let inner = self.inner.lock();
        if inner.fail_chain_query {
            return Err(ProviderRpcError::new(-32603, "internal provider error"));
        }
        Ok(inner.chain)
    }

    async fn switch_chain(&self, chain: ChainId) -> Result<(), ProviderRpcError> {
        let mut inner = self.inner.lock();
        inner.switch_requests += 1;
        if !inner.known_chains.contains(&chain) {
            return Err(ProviderRpcError::new(
                UNRECOGNIZED_CHAIN,
                "unrecognized chain id",
            ));
        }
        if inner.decline_switch {
            return Err(ProviderRpcError::new(USER_REJECTED, "user rejected the request"));
        }
        inner.chain = chain;
        Ok(())
    }

    async fn call(&self, request: CallRequest) -> Result<Value, ProviderRpcError> {
        let inner = self.inner.lock();
        inner
            .call_results
            .get(&request.method)
            .cloned()
            .ok_or_else(|| ProviderRpcError::new(-32601, format!("no result scripted for {}", request.method)))
    }

    async fn send_transaction(&self, request: CallRequest) -> Result<String, ProviderRpcError> {
        let mut inner = self.inner.lock();
        inner.submitted.push(request);
        Ok(format!("0xtx{:04}", inner.submitted.len()))
    }

    fn subscribe(&self) -> Receiver<ProviderEvent> {
        self.events_rx.clone()
    }
}
