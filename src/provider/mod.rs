//! Provider boundary: the injected wallet object the session talks to.
//!
//! ```text
//! SessionManager
//!     │  request(RpcMethod) ──────────────► Provider ──► wallet extension
//!     │                                        │
//!     └── UnboundedReceiver<ProviderEvent> ◄───┘ accountsChanged / chainChanged
//! ```
//!
//! Implementations:
//! - [`MockProvider`]: scripted, in-memory (tests, CLI)
//! - `wasm::InjectedProvider`: `window.ethereum` in the browser (`wasm` feature)

mod mock;

pub use mock::{Gate, MockProvider};

use crate::core::methods::{events, rpc};
use crate::core::{ChainId, NetworkConfig};
use crate::error::ProviderError;
use async_trait::async_trait;
use futures::channel::mpsc;
use serde_json::{json, Value};

/// A request the session can make.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcMethod {
    /// Silent query for already-authorized accounts (no prompt).
    Accounts,
    /// Permissioned account request (shows the wallet prompt).
    RequestAccounts,
    ChainId,
    SwitchChain(ChainId),
    AddChain(NetworkConfig),
}

impl RpcMethod {
    pub fn name(&self) -> &'static str {
        match self {
            RpcMethod::Accounts => rpc::ACCOUNTS,
            RpcMethod::RequestAccounts => rpc::REQUEST_ACCOUNTS,
            RpcMethod::ChainId => rpc::CHAIN_ID,
            RpcMethod::SwitchChain(_) => rpc::SWITCH_CHAIN,
            RpcMethod::AddChain(_) => rpc::ADD_CHAIN,
        }
    }

    pub fn params(&self) -> Option<Value> {
        match self {
            RpcMethod::SwitchChain(chain) => Some(json!([{ "chainId": chain.to_hex() }])),
            RpcMethod::AddChain(config) => Some(json!([config])),
            _ => None,
        }
    }

    /// `{method, params}` object as handed to `provider.request`.
    pub fn to_request(&self) -> Value {
        match self.params() {
            Some(params) => json!({ "method": self.name(), "params": params }),
            None => json!({ "method": self.name() }),
        }
    }
}

/// Push notification from the wallet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    ChainChanged(String),
    /// A known event whose payload had the wrong shape. Never applied to the
    /// session; reported instead.
    Malformed { event: &'static str, payload: String },
}

impl ProviderEvent {
    /// Build from an event name and its raw payload. Unknown names yield `None`.
    ///
    /// `accountsChanged` must carry an array of strings, `chainChanged` a string.
    pub fn from_raw(name: &str, payload: &Value) -> Option<Self> {
        let malformed = |event| ProviderEvent::Malformed { event, payload: payload.to_string() };
        match name {
            events::ACCOUNTS_CHANGED => {
                let accounts: Option<Vec<String>> = payload
                    .as_array()
                    .and_then(|items| items.iter().map(|v| v.as_str().map(String::from)).collect());
                Some(accounts.map_or_else(|| malformed(events::ACCOUNTS_CHANGED), ProviderEvent::AccountsChanged))
            }
            events::CHAIN_CHANGED => Some(match payload.as_str() {
                Some(chain) => ProviderEvent::ChainChanged(chain.to_string()),
                None => malformed(events::CHAIN_CHANGED),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProviderEvent::AccountsChanged(_) => events::ACCOUNTS_CHANGED,
            ProviderEvent::ChainChanged(_) => events::CHAIN_CHANGED,
            ProviderEvent::Malformed { event, .. } => event,
        }
    }
}

/// EIP-1193 style wallet provider.
///
/// Futures are `?Send`: providers live on the page's single event loop.
#[async_trait(?Send)]
pub trait Provider {
    async fn request(&self, method: RpcMethod) -> Result<Value, ProviderError>;

    /// Register for `accountsChanged` and `chainChanged`. Events flow until
    /// [`Provider::remove_all_listeners`] is called.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;

    fn remove_all_listeners(&self);
}
