//! # GHC Wallet Session - Library Root
//!
//! Wallet-connection core for the **Green Hydrogen Credit** marketplace:
//! a single source of truth for the external wallet's account/session
//! state, kept synchronized with the provider and exposed to the rest of
//! the application as a small capability surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │              wallet-session (this crate)             │
//! ├──────────────────────────────────────────────────────┤
//! │  WalletSession  - connection lifecycle state machine │
//! │  Provider       - injected wallet boundary (trait)   │
//! │  Signer         - per-account signing capability     │
//! │  ContractHandle - GHC credit registry capability     │
//! └──────────────────────────────────────────────────────┘
//!          │ requests + push events
//!          ▼
//! ┌──────────────────────────┐
//! │  Injected wallet provider │  (opaque collaborator)
//! └──────────────────────────┘
//! ```
//!
//! ## Core Concepts
//!
//! - **State as the contract**: consumers read a published
//!   [`SessionState`] record (account, signer, contract, error) through a
//!   watch channel. Failures land in the `error` field; nothing is thrown
//!   across the public boundary.
//! - **Network enforcement**: the session targets exactly one required
//!   chain. On mismatch it first requests an automatic switch; only when
//!   that fails does it surface an actionable error. Operating against the
//!   wrong network never silently succeeds.
//! - **Event-driven**: provider push events (accounts changed, chain
//!   changed) are consumed by a listener task attached at startup and
//!   detached at shutdown. A chain change triggers a full session
//!   re-initialization rather than partial state patching.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use wallet_session::{SessionConfig, WalletSession};
//!
//! # async fn run(provider: Arc<dyn wallet_session::Provider>) {
//! wallet_session::provider::register_injected(provider);
//!
//! let session = WalletSession::new(SessionConfig::default());
//! session.attach();
//! session.check_connection().await;
//!
//! let mut states = session.subscribe();
//! session.connect().await;
//! let contract = states.borrow().contract.clone();
//! if let Some(contract) = contract {
//!     let balance = contract.balance_of("0xABC…").await;
//! }
//! # }
//! ```
//!
//! ## Testing
//!
//! Run all tests:
//! ```bash
//! cargo test -p wallet-session
//! ```

pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod provider;
pub mod session;
pub mod signer;

// Re-export the types consumers touch on every interaction.
pub use chain::ChainId;
pub use config::SessionConfig;
pub use contract::{ContractHandle, CreditDetails};
pub use error::SessionError;
pub use provider::{Provider, ProviderEvent};
pub use session::{SessionState, SessionStatus, WalletSession};
pub use signer::Signer;
