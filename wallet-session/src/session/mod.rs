//! # Wallet Session
//!
//! Single source of truth for "is a wallet connected, to what account, on
//! what network, with what signing/contract capability", kept synchronized
//! with an external, asynchronously-mutating wallet provider.
//!
//! ## Architecture
//!
//! - One [`WalletSession`] per application, constructed at startup. The
//!   value is a cheap-clone handle; clones share the same underlying
//!   session, so consumers receive it by handle rather than recreating it.
//! - Published state flows through a `tokio::sync::watch` channel:
//!   consumers [`subscribe`](WalletSession::subscribe) or take one-off
//!   [`snapshot`](WalletSession::snapshot)s; they never mutate the record.
//! - Provider push events (accounts changed, chain changed) arrive on an
//!   `async-channel` receiver consumed by a listener task spawned by
//!   [`attach`](WalletSession::attach) and detached by
//!   [`shutdown`](WalletSession::shutdown) or drop of the last handle, so
//!   no handler fires after teardown.
//!
//! ## Failure semantics
//!
//! Every failure is captured into the published `error` field and never
//! thrown across the public contract. Nothing is retried automatically;
//! retry is a user-initiated `connect()`.
//!
//! ## Write ordering
//!
//! Authoritative writes (disconnect, provider events, reinitialize) bump a
//! generation counter; an in-flight `connect()` commits its result only if
//! its generation is still current, so a stale provider response can never
//! resurrect a session the user has since torn down. Chain-changed is
//! treated as authoritative regardless of any concurrently in-flight
//! connect and triggers a full re-initialization rather than partial state
//! patching, because provider network semantics are not guaranteed stable
//! mid-session.

mod state;

pub use state::{SessionState, SessionStatus};

use crate::config::SessionConfig;
use crate::contract::{ContractHandle, ContractInterface, GHC_CREDIT_ABI};
use crate::error::SessionError;
use crate::provider::{self, Provider, ProviderEvent};
use crate::signer::Signer;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Where the session looks up its provider.
enum ProviderSource {
    /// The process-global injected slot (the browser-style default).
    Injected,
    /// A directly supplied provider, or deliberately none.
    Fixed(Option<Arc<dyn Provider>>),
}

/// Wallet connection lifecycle owner.
///
/// See the [module docs](self) for the overall design. The two commands
/// are [`connect`](Self::connect) and [`disconnect`](Self::disconnect);
/// everything else reacts to the provider.
#[derive(Clone)]
pub struct WalletSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    source: ProviderSource,
    interface: Arc<ContractInterface>,
    state_tx: watch::Sender<SessionState>,
    status: Mutex<SessionStatus>,
    /// Bumped on every authoritative write; guards stale async commits.
    generation: Mutex<u64>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl WalletSession {
    /// Create a session that resolves the provider from the process-global
    /// injected slot on every operation, mirroring a browser environment.
    pub fn new(config: SessionConfig) -> Self {
        Self::build(config, ProviderSource::Injected)
    }

    /// Create a session with a directly supplied provider (or none, to
    /// model an environment without a wallet extension).
    pub fn with_provider(config: SessionConfig, provider: Option<Arc<dyn Provider>>) -> Self {
        Self::build(config, ProviderSource::Fixed(provider))
    }

    fn build(config: SessionConfig, source: ProviderSource) -> Self {
        let interface = Arc::new(
            ContractInterface::parse(GHC_CREDIT_ABI)
                .expect("embedded contract interface must parse"),
        );
        let (state_tx, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(SessionInner {
                config,
                source,
                interface,
                state_tx,
                status: Mutex::new(SessionStatus::default()),
                generation: Mutex::new(0),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to published state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state_tx.subscribe()
    }

    /// One-off copy of the current published state.
    pub fn snapshot(&self) -> SessionState {
        self.inner.state_tx.borrow().clone()
    }

    /// Diagnostic counters.
    pub fn status(&self) -> SessionStatus {
        self.inner.status.lock().clone()
    }

    /// Spawn the provider event listener. Idempotent; replaces any
    /// previous listener.
    ///
    /// The task holds only a weak reference to the session, so dropping
    /// the last handle tears the listener down as well.
    pub fn attach(&self) {
        let Some(provider) = self.inner.provider() else {
            tracing::debug!("no wallet provider detected, session not attached");
            return;
        };
        let events = provider.subscribe();
        let session = Arc::downgrade(&self.inner);
        let handle = tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                let Some(session) = session.upgrade() else {
                    break;
                };
                session.handle_event(event).await;
            }
        });
        if let Some(previous) = self.inner.listener.lock().replace(handle) {
            previous.abort();
        }
    }

    /// Detach the event listener. No handler fires afterwards.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Connect to the wallet: detect the provider, enforce the required
    /// network (attempting an automatic switch first), then request account
    /// authorization and derive the signer/contract capabilities.
    ///
    /// All failures surface through the published `error` field; on full
    /// success any prior error is cleared.
    pub async fn connect(&self) {
        self.inner.connect().await;
    }

    /// Reset local session state. Safe to call when already disconnected.
    ///
    /// This cannot revoke provider-side authorization (the provider has no
    /// portable API for that); it is a local reset, not a security
    /// boundary.
    pub fn disconnect(&self) {
        self.inner.disconnect();
    }

    /// Non-interactive startup probe: resolve an already-authorized
    /// account without prompting the user.
    ///
    /// A missing provider is an expected condition here and sets no error;
    /// query failures surface as [`SessionError::Query`] with the previous
    /// capability state preserved.
    pub async fn check_connection(&self) {
        self.inner.check_connection().await;
    }

    /// Full re-initialization: reset to a fresh disconnected state, then
    /// re-run the connection check.
    ///
    /// This replaces the page reload a browser app would perform on a
    /// chain change, and is callable from tests without restarting a
    /// process.
    pub async fn reinitialize(&self) {
        self.inner.reinitialize().await;
    }
}

impl SessionInner {
    fn provider(&self) -> Option<Arc<dyn Provider>> {
        match &self.source {
            ProviderSource::Injected => provider::injected(),
            ProviderSource::Fixed(provider) => provider.clone(),
        }
    }

    fn current_generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Apply `mutate` to the published state only if no authoritative
    /// write has happened since `generation` was captured.
    fn publish_if_current(&self, generation: u64, mutate: impl FnOnce(&mut SessionState)) -> bool {
        let guard = self.generation.lock();
        if *guard != generation {
            tracing::debug!(
                stale = generation,
                current = *guard,
                "discarding stale session write"
            );
            return false;
        }
        self.state_tx.send_modify(mutate);
        true
    }

    fn shutdown(&self) {
        if let Some(listener) = self.listener.lock().take() {
            listener.abort();
            tracing::debug!("session event listener detached");
        }
    }

    async fn connect(&self) {
        let generation = self.current_generation();
        self.status.lock().connect_attempts += 1;

        let Some(provider) = self.provider() else {
            tracing::warn!("connect requested but no wallet provider is present");
            self.publish_if_current(generation, |s| {
                s.error = Some(SessionError::ProviderNotFound);
            });
            return;
        };

        if !self.ensure_required_chain(&provider, generation).await {
            return;
        }

        match provider.request_accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => self.commit_connected(&provider, account, generation),
                None => {
                    self.publish_if_current(generation, |s| {
                        s.error = Some(SessionError::ConnectionRequest(
                            "no account authorized".to_string(),
                        ));
                    });
                }
            },
            Err(e) => {
                tracing::warn!(code = e.code, "account authorization failed: {}", e.message);
                self.publish_if_current(generation, |s| {
                    s.error = Some(SessionError::ConnectionRequest(e.message.clone()));
                });
            }
        }
    }

    fn disconnect(&self) {
        let changed = {
            let mut guard = self.generation.lock();
            *guard += 1;
            self.state_tx.send_if_modified(|s| {
                if s.account.is_none() && s.signer.is_none() && s.contract.is_none() {
                    return false;
                }
                s.clear_capabilities();
                true
            })
        };
        if changed {
            tracing::info!("wallet disconnected");
        }
    }

    async fn check_connection(&self) {
        let generation = self.current_generation();

        let Some(provider) = self.provider() else {
            tracing::debug!("no wallet provider detected");
            return;
        };

        if !self.ensure_required_chain(&provider, generation).await {
            return;
        }

        match provider.accounts().await {
            Ok(accounts) => match accounts.into_iter().next() {
                Some(account) => self.commit_connected(&provider, account, generation),
                None => tracing::debug!("no authorized account found"),
            },
            Err(e) => {
                tracing::warn!(code = e.code, "account query failed: {}", e.message);
                self.publish_if_current(generation, |s| {
                    s.error = Some(SessionError::Query(e.message.clone()));
                });
            }
        }
    }

    async fn reinitialize(&self) {
        {
            let mut guard = self.generation.lock();
            *guard += 1;
            self.state_tx.send_modify(|s| *s = SessionState::default());
        }
        tracing::info!("session reinitialized");
        self.check_connection().await;
    }

    /// Verify the active chain equals the required chain, requesting an
    /// automatic switch on mismatch. Returns whether the session may
    /// proceed to account authorization.
    async fn ensure_required_chain(
        &self,
        provider: &Arc<dyn Provider>,
        generation: u64,
    ) -> bool {
        let required = self.config.required_chain;

        let active = match provider.chain_id().await {
            Ok(chain) => chain,
            Err(e) => {
                tracing::warn!(code = e.code, "chain query failed: {}", e.message);
                self.publish_if_current(generation, |s| {
                    s.error = Some(SessionError::Query(e.message.clone()));
                });
                return false;
            }
        };

        if active == required {
            return true;
        }

        tracing::warn!(%active, %required, "wrong network, requesting switch");
        match provider.switch_chain(required).await {
            Ok(()) => {
                // The switch prompt resolved; trust it only after the
                // provider reports the required chain as active.
                match provider.chain_id().await {
                    Ok(chain) if chain == required => true,
                    _ => {
                        self.publish_if_current(generation, |s| {
                            s.error = Some(SessionError::WrongNetwork { required });
                        });
                        false
                    }
                }
            }
            Err(e) if e.is_unrecognized_chain() => {
                tracing::warn!(%required, "required chain not registered in wallet");
                self.publish_if_current(generation, |s| {
                    s.error = Some(SessionError::UnknownNetwork { required });
                });
                false
            }
            Err(e) => {
                tracing::warn!(code = e.code, "chain switch failed: {}", e.message);
                self.publish_if_current(generation, |s| {
                    s.error = Some(SessionError::WrongNetwork { required });
                });
                false
            }
        }
    }

    /// Derive capabilities for `account` and publish the connected state,
    /// clearing any prior error.
    fn commit_connected(&self, provider: &Arc<dyn Provider>, account: String, generation: u64) {
        let signer = Signer::new(
            account.clone(),
            self.config.required_chain,
            Arc::clone(provider),
        );
        let contract = ContractHandle::new(
            self.config.contract_address.clone(),
            Arc::clone(&self.interface),
            signer.clone(),
        );
        let committed = self.publish_if_current(generation, |s| {
            s.account = Some(account.clone());
            s.signer = Some(signer);
            s.contract = Some(contract);
            s.error = None;
        });
        if committed {
            self.status.lock().last_connected = Some(Instant::now());
            tracing::info!(%account, "wallet connected");
        }
    }

    async fn handle_event(&self, event: ProviderEvent) {
        self.status.lock().events_handled += 1;
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.into_iter().next() {
                None => {
                    tracing::info!("provider reported no authorized accounts");
                    self.disconnect();
                }
                Some(account) => self.account_switched(account).await,
            },
            ProviderEvent::ChainChanged(chain) => {
                tracing::info!(%chain, "provider chain changed");
                self.reinitialize().await;
            }
        }
    }

    /// The provider switched to a different account: adopt it, then
    /// re-validate the network before re-deriving capabilities.
    async fn account_switched(&self, account: String) {
        let generation = {
            let mut guard = self.generation.lock();
            *guard += 1;
            let generation = *guard;
            let adopted = account.clone();
            self.state_tx.send_modify(move |s| {
                s.account = Some(adopted);
                s.signer = None;
                s.contract = None;
            });
            generation
        };
        tracing::info!(%account, "provider switched account");

        let Some(provider) = self.provider() else {
            return;
        };
        if self.ensure_required_chain(&provider, generation).await {
            self.commit_connected(&provider, account, generation);
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
