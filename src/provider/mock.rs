//! MockProvider - scripted in-memory wallet
//!
//! Behaves like a browser wallet extension: accounts must be granted before
//! `eth_accounts` returns them, switching to an unknown chain fails with
//! 4902 until the chain is added, and chain changes are pushed to listeners.

use super::{Provider, ProviderEvent, RpcMethod};
use crate::core::ChainId;
use crate::error::ProviderError;
use async_trait::async_trait;
use futures::channel::{mpsc, oneshot};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

struct MockState {
    /// Accounts already authorized for this page.
    authorized: Vec<String>,
    /// Accounts the wallet hands over once the user approves.
    wallet_accounts: Vec<String>,
    chain: ChainId,
    known_chains: HashSet<ChainId>,
    reject_prompt: bool,
    failures: HashMap<&'static str, ProviderError>,
    calls: Vec<RpcMethod>,
    listeners: Vec<mpsc::UnboundedSender<ProviderEvent>>,
    holds: HashMap<&'static str, oneshot::Receiver<()>>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            authorized: Vec::new(),
            wallet_accounts: Vec::new(),
            chain: ChainId(1),
            known_chains: HashSet::from([ChainId(1)]),
            reject_prompt: false,
            failures: HashMap::new(),
            calls: Vec::new(),
            listeners: Vec::new(),
            holds: HashMap::new(),
        }
    }
}

/// Handle that keeps one request pending until released (or dropped).
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

#[derive(Clone, Default)]
pub struct MockProvider {
    state: Rc<RefCell<MockState>>,
}

impl MockProvider {
    /// Wallet on mainnet (`0x1`) with no accounts and no extra chains known.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts the page is already authorized for (silent query returns them).
    pub fn with_authorized(self, accounts: &[&str]) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.authorized = accounts.iter().map(|a| a.to_string()).collect();
            state.wallet_accounts = state.authorized.clone();
        }
        self
    }

    /// Accounts granted once the user approves the permission prompt.
    pub fn with_wallet_accounts(self, accounts: &[&str]) -> Self {
        self.state.borrow_mut().wallet_accounts = accounts.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_chain(self, chain: ChainId) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.chain = chain;
            state.known_chains.insert(chain);
        }
        self
    }

    pub fn with_known_chain(self, chain: ChainId) -> Self {
        self.state.borrow_mut().known_chains.insert(chain);
        self
    }

    /// Every permission prompt is dismissed (4001).
    pub fn rejecting_prompt(self) -> Self {
        self.state.borrow_mut().reject_prompt = true;
        self
    }

    /// Fail every call of `method` (an `rpc::*` name) with `error`.
    pub fn failing(self, method: &'static str, error: ProviderError) -> Self {
        self.state.borrow_mut().failures.insert(method, error);
        self
    }

    /// Keep the next call of `method` pending until the gate is released.
    pub fn hold(&self, method: &'static str) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.state.borrow_mut().holds.insert(method, rx);
        Gate(tx)
    }

    pub fn calls(&self) -> Vec<RpcMethod> {
        self.state.borrow().calls.clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.state.borrow().calls.iter().filter(|c| c.name() == method).count()
    }

    pub fn chain(&self) -> ChainId {
        self.state.borrow().chain
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.iter().filter(|tx| !tx.is_closed()).count()
    }

    /// Simulate the user acting inside the wallet UI.
    pub fn push(&self, event: ProviderEvent) {
        let mut state = self.state.borrow_mut();
        if let ProviderEvent::ChainChanged(raw) = &event {
            if let Ok(chain) = ChainId::parse(raw) {
                state.chain = chain;
            }
        }
        if let ProviderEvent::AccountsChanged(accounts) = &event {
            state.authorized = accounts.clone();
        }
        state.listeners.retain(|tx| tx.unbounded_send(event.clone()).is_ok());
    }

    fn set_chain(&self, chain: ChainId) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.chain != chain;
            state.chain = chain;
            changed
        };
        if changed {
            self.push(ProviderEvent::ChainChanged(chain.to_hex()));
        }
    }

    fn respond(&self, method: &RpcMethod) -> Result<Value, ProviderError> {
        if let Some(err) = self.state.borrow().failures.get(method.name()) {
            return Err(err.clone());
        }
        match method {
            RpcMethod::Accounts => Ok(json!(self.state.borrow().authorized)),
            RpcMethod::RequestAccounts => {
                let mut state = self.state.borrow_mut();
                if state.reject_prompt {
                    return Err(ProviderError::user_rejected());
                }
                state.authorized = state.wallet_accounts.clone();
                Ok(json!(state.authorized))
            }
            RpcMethod::ChainId => Ok(json!(self.state.borrow().chain.to_hex())),
            RpcMethod::SwitchChain(chain) => {
                if !self.state.borrow().known_chains.contains(chain) {
                    return Err(ProviderError::unrecognized_chain());
                }
                self.set_chain(*chain);
                Ok(Value::Null)
            }
            RpcMethod::AddChain(config) => {
                self.state.borrow_mut().known_chains.insert(config.chain_id);
                self.set_chain(config.chain_id);
                Ok(Value::Null)
            }
        }
    }
}

#[async_trait(?Send)]
impl Provider for MockProvider {
    async fn request(&self, method: RpcMethod) -> Result<Value, ProviderError> {
        let hold = {
            let mut state = self.state.borrow_mut();
            state.calls.push(method.clone());
            state.holds.remove(method.name())
        };
        if let Some(rx) = hold {
            let _ = rx.await;
        }
        self.respond(&method)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let (tx, rx) = mpsc::unbounded();
        self.state.borrow_mut().listeners.push(tx);
        rx
    }

    fn remove_all_listeners(&self) {
        self.state.borrow_mut().listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::methods::rpc;
    use crate::core::NetworkConfig;

    const ALICE: &str = "0xABCD000000000000000000000000000000001234";

    #[tokio::test]
    async fn test_accounts_need_approval() {
        let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]);
        assert_eq!(wallet.request(RpcMethod::Accounts).await.unwrap(), json!([]));
        assert_eq!(wallet.request(RpcMethod::RequestAccounts).await.unwrap(), json!([ALICE]));
        assert_eq!(wallet.request(RpcMethod::Accounts).await.unwrap(), json!([ALICE]));
    }

    #[tokio::test]
    async fn test_switch_unknown_chain_then_add() {
        let wallet = MockProvider::new();
        let err = wallet.request(RpcMethod::SwitchChain(ChainId::AVALANCHE_FUJI)).await.unwrap_err();
        assert!(err.is_unrecognized_chain());

        let mut rx = wallet.subscribe();
        wallet.request(RpcMethod::AddChain(NetworkConfig::avalanche_fuji())).await.unwrap();
        assert_eq!(wallet.chain(), ChainId::AVALANCHE_FUJI);
        assert_eq!(rx.try_next().unwrap(), Some(ProviderEvent::ChainChanged("0xa869".into())));
    }

    #[tokio::test]
    async fn test_failure_override() {
        let wallet = MockProvider::new().failing(rpc::CHAIN_ID, ProviderError::new(-32603, "boom"));
        assert_eq!(wallet.request(RpcMethod::ChainId).await.unwrap_err().code, -32603);
        assert_eq!(wallet.call_count(rpc::CHAIN_ID), 1);
    }

    #[test]
    fn test_remove_all_listeners_closes_streams() {
        let wallet = MockProvider::new();
        let mut rx = wallet.subscribe();
        assert_eq!(wallet.listener_count(), 1);
        wallet.remove_all_listeners();
        assert_eq!(wallet.listener_count(), 0);
        assert_eq!(rx.try_next().unwrap(), None);
    }
}
