//! Session state and its single transition function.
//!
//! Connection and network are independent axes:
//!
//! ```text
//!            Unknown     Correct     Incorrect
//! Disconnected   ●
//! Connecting     ●
//! Connected      ●           ★           ●
//! ```
//!
//! Only ★ (Connected, Correct) unlocks the dashboard.

use crate::core::{Address, ChainId, NetworkStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

/// Inputs to [`Session::apply`]. Both the connect workflow and provider
/// push events are expressed as these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// User gesture started: Disconnected → Connecting.
    ConnectStarted,
    /// Connect ended without an account: Connecting → Disconnected.
    ConnectAborted,
    /// Account list from the provider. Empty resets the session, otherwise
    /// the first entry becomes the active account.
    AccountsReceived(Vec<Address>),
    /// Chain id reported by the provider.
    ChainObserved(ChainId),
    /// Network outcome of a switch/add attempt.
    NetworkSettled(NetworkStatus),
}

/// Transient wallet session. `account` is `Some` iff `connection` is
/// `Connected`; fields are private so only [`Session::apply`] mutates them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    connection: ConnectionState,
    account: Option<Address>,
    network: NetworkStatus,
}

impl Session {
    pub fn new() -> Self { Self::default() }

    pub fn connection(&self) -> ConnectionState { self.connection }
    pub fn account(&self) -> Option<&Address> { self.account.as_ref() }
    pub fn network(&self) -> NetworkStatus { self.network }

    pub fn is_connected(&self) -> bool { self.connection == ConnectionState::Connected }

    /// (Connected, Correct).
    pub fn is_ready(&self) -> bool {
        self.is_connected() && self.network == NetworkStatus::Correct
    }

    /// Apply one event. Returns whether anything changed.
    pub fn apply(&mut self, event: SessionEvent, target: ChainId) -> bool {
        let before = self.clone();
        match event {
            SessionEvent::ConnectStarted => {
                if self.connection == ConnectionState::Disconnected {
                    self.connection = ConnectionState::Connecting;
                }
            }
            SessionEvent::ConnectAborted => {
                if self.connection == ConnectionState::Connecting {
                    self.connection = ConnectionState::Disconnected;
                }
            }
            SessionEvent::AccountsReceived(accounts) => match accounts.into_iter().next() {
                Some(first) => {
                    self.connection = ConnectionState::Connected;
                    self.account = Some(first);
                }
                None => *self = Session::default(),
            },
            SessionEvent::ChainObserved(chain) => {
                self.network = NetworkStatus::evaluate(chain, target);
            }
            SessionEvent::NetworkSettled(status) => self.network = status,
        }
        debug_assert_eq!(self.account.is_some(), self.is_connected());
        let changed = *self != before;
        if changed {
            tracing::debug!(
                from = before.connection.as_str(),
                to = self.connection.as_str(),
                network = self.network.as_str(),
                "session transition"
            );
        }
        changed
    }
}

/// Serializable view of the session for hosts (CLI output, JS bindings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub connection_state: ConnectionState,
    pub account: Option<String>,
    pub display_account: Option<String>,
    pub network: NetworkStatus,
    pub target_chain: ChainId,
    pub is_initial_loading: bool,
    pub is_connecting: bool,
    pub is_ready: bool,
}
