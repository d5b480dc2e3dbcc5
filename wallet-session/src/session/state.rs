//! # Session State Types
//!
//! The single published state record and its diagnostics companion. The
//! record is owned exclusively by the session; consumers read snapshots
//! through the watch channel and never mutate it directly.

use crate::contract::ContractHandle;
use crate::error::SessionError;
use crate::signer::Signer;
use std::time::Instant;

/// Published wallet session state.
///
/// Derivation invariant: `contract` is set only if `signer` is set, which
/// is set only if `account` is set and the active network equals the
/// required network at derivation time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Currently authorized wallet account; `None` means disconnected.
    pub account: Option<String>,
    /// Signing capability bound to `account`.
    pub signer: Option<Signer>,
    /// Contract-interaction capability bound to `signer`.
    pub contract: Option<ContractHandle>,
    /// Last actionable error; cleared on a fully successful connect.
    pub error: Option<SessionError>,
}

impl SessionState {
    /// Connected with full capability surface on the required network.
    pub fn is_connected(&self) -> bool {
        self.contract.is_some()
    }

    /// The authorized account address, if any.
    pub fn address(&self) -> Option<&str> {
        self.account.as_deref()
    }

    /// Whether the capability derivation chain is internally consistent.
    pub fn invariants_hold(&self) -> bool {
        if self.contract.is_some() && self.signer.is_none() {
            return false;
        }
        if self.signer.is_some() && self.account.is_none() {
            return false;
        }
        true
    }

    /// Drop all capabilities, leaving `error` untouched. Local reset only;
    /// provider-side authorization cannot be revoked.
    pub(crate) fn clear_capabilities(&mut self) {
        self.account = None;
        self.signer = None;
        self.contract = None;
    }
}

/// Diagnostic counters published alongside the state.
#[derive(Debug, Clone, Default)]
pub struct SessionStatus {
    /// Number of `connect()` invocations since construction.
    pub connect_attempts: u64,
    /// Time of the last successful connect, if any.
    pub last_connected: Option<Instant>,
    /// Provider push events handled by the listener task.
    pub events_handled: u64,
}
