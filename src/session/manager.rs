//! SessionManager - owns the wallet session for the lifetime of a view.
//!
//! Two writers share the session: the `connect()` workflow and provider push
//! events. Both go through [`Session::apply`]. When they race, the push wins:
//! every applied push bumps an epoch, and a `connect()` step whose epoch
//! moved while it was suspended drops its write.

use super::notice::{messages, Notice, NoticeBus};
use super::state::{Session, SessionEvent, SessionSnapshot};
use crate::config::SessionConfig;
use crate::core::{Address, ChainId, NetworkStatus};
use crate::error::{SessionError, SessionResult};
use crate::provider::{Provider, ProviderEvent, RpcMethod};
use futures::channel::mpsc;
use futures::StreamExt;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use tracing::{debug, error, info, warn};

/// How a `connect()` call ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// Connected and on the target network.
    Ready,
    /// Connected, but the network could not be corrected.
    WrongNetwork(SessionError),
    /// The user dismissed the permission prompt.
    Cancelled,
    /// The wallet approved but handed over no account.
    NoAccounts,
    /// Another `connect()` is in flight; nothing was requested.
    AlreadyInProgress,
    /// No injected provider on this page.
    NoProvider,
    /// A push event disconnected the wallet while `connect()` was suspended.
    Superseded,
    Failed(SessionError),
}

impl ConnectOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectOutcome::Ready => "ready",
            ConnectOutcome::WrongNetwork(_) => "wrong_network",
            ConnectOutcome::Cancelled => "cancelled",
            ConnectOutcome::NoAccounts => "no_accounts",
            ConnectOutcome::AlreadyInProgress => "in_progress",
            ConnectOutcome::NoProvider => "no_provider",
            ConnectOutcome::Superseded => "superseded",
            ConnectOutcome::Failed(_) => "failed",
        }
    }
}

pub struct SessionManager<P: Provider> {
    provider: Option<P>,
    config: SessionConfig,
    session: RefCell<Session>,
    initial_loading: Cell<bool>,
    initialized: Cell<bool>,
    connecting: Cell<bool>,
    account_epoch: Cell<u64>,
    chain_epoch: Cell<u64>,
    environment_reported: Cell<bool>,
    torn_down: Cell<bool>,
    events: RefCell<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
    notices: NoticeBus,
}

impl<P: Provider> SessionManager<P> {
    /// Mount: subscribe to provider events. Call [`Self::initialize`] next.
    pub fn new(provider: Option<P>, config: SessionConfig) -> Self {
        let events = provider.as_ref().map(|p| p.subscribe());
        Self {
            provider,
            config,
            session: RefCell::new(Session::new()),
            initial_loading: Cell::new(true),
            initialized: Cell::new(false),
            connecting: Cell::new(false),
            account_epoch: Cell::new(0),
            chain_epoch: Cell::new(0),
            environment_reported: Cell::new(false),
            torn_down: Cell::new(false),
            events: RefCell::new(events),
            notices: NoticeBus::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig { &self.config }
    pub fn has_provider(&self) -> bool { self.provider.is_some() }
    pub fn session(&self) -> Session { self.session.borrow().clone() }
    pub fn is_ready(&self) -> bool { self.session.borrow().is_ready() }
    pub fn is_initial_loading(&self) -> bool { self.initial_loading.get() }
    pub fn is_connecting(&self) -> bool { self.connecting.get() }

    fn target(&self) -> ChainId { self.config.target.chain_id }

    /// `0xABCD…1234` label of the active account.
    pub fn display_account(&self) -> Option<String> {
        self.session
            .borrow()
            .account()
            .map(|a| a.display_short(self.config.address_prefix, self.config.address_suffix))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.borrow();
        SessionSnapshot {
            connection_state: session.connection(),
            account: session.account().map(|a| a.to_string()),
            display_account: self.display_account(),
            network: session.network(),
            target_chain: self.target(),
            is_initial_loading: self.initial_loading.get(),
            is_connecting: self.connecting.get(),
            is_ready: session.is_ready(),
        }
    }

    pub fn subscribe_notices(&self) -> mpsc::UnboundedReceiver<Notice> {
        self.notices.subscribe()
    }

    fn apply(&self, event: SessionEvent) -> bool {
        self.session.borrow_mut().apply(event, self.target())
    }

    fn report_no_provider(&self) {
        if !self.environment_reported.replace(true) {
            warn!("no injected wallet provider");
            self.notices.emit(Notice::error(messages::NO_PROVIDER));
        }
    }

    // =========================================================================
    // INITIALIZE
    // =========================================================================

    /// Silent hydration at mount. Never prompts; clears the loading flag once.
    pub async fn initialize(&self) {
        if self.initialized.replace(true) {
            return;
        }
        match self.provider.as_ref() {
            None => self.report_no_provider(),
            Some(provider) => {
                if let Err(e) = self.hydrate(provider).await {
                    warn!(error = %e, "session hydration failed");
                    self.notices.emit(Notice::error(messages::HYDRATE_FAILED));
                }
            }
        }
        self.initial_loading.set(false);
        debug!(state = ?self.snapshot(), "session initialized");
    }

    async fn hydrate(&self, provider: &P) -> SessionResult<()> {
        let epoch = self.account_epoch.get();
        let accounts = parse_accounts(provider.request(RpcMethod::Accounts).await?)?;
        if accounts.is_empty() {
            return Ok(());
        }
        if self.account_epoch.get() != epoch {
            debug!("hydration superseded by accountsChanged");
            return Ok(());
        }
        self.apply(SessionEvent::AccountsReceived(accounts));
        self.observe_chain(provider).await.map(|_| ())
    }

    /// Read the active chain and record the network status unless a push
    /// landed meanwhile.
    async fn observe_chain(&self, provider: &P) -> SessionResult<ChainId> {
        let epoch = self.chain_epoch.get();
        let chain = parse_chain(provider.request(RpcMethod::ChainId).await?)?;
        if self.chain_epoch.get() == epoch {
            self.apply(SessionEvent::ChainObserved(chain));
        } else {
            debug!(%chain, "chain read superseded by chainChanged");
        }
        Ok(chain)
    }

    // =========================================================================
    // CONNECT
    // =========================================================================

    /// User gesture: request accounts, then correct the network if needed.
    pub async fn connect(&self) -> ConnectOutcome {
        if self.connecting.get() {
            debug!("connect already in progress");
            return ConnectOutcome::AlreadyInProgress;
        }
        let Some(provider) = self.provider.as_ref() else {
            self.report_no_provider();
            return ConnectOutcome::NoProvider;
        };

        self.connecting.set(true);
        self.apply(SessionEvent::ConnectStarted);
        let result = self.try_connect(provider).await;
        self.apply(SessionEvent::ConnectAborted);
        self.connecting.set(false);

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(SessionError::UserRejected) => ConnectOutcome::Cancelled,
            Err(e @ SessionError::NetworkSwitch { .. }) => ConnectOutcome::WrongNetwork(e),
            Err(e) => ConnectOutcome::Failed(e),
        };
        self.report(&outcome);
        outcome
    }

    async fn try_connect(&self, provider: &P) -> SessionResult<ConnectOutcome> {
        let epoch = self.account_epoch.get();
        let accounts = parse_accounts(provider.request(RpcMethod::RequestAccounts).await?)?;
        if accounts.is_empty() {
            // No authorized account: drop any account held from before.
            if self.account_epoch.get() == epoch {
                self.apply(SessionEvent::AccountsReceived(accounts));
            }
            return Ok(ConnectOutcome::NoAccounts);
        }
        if self.account_epoch.get() == epoch {
            self.apply(SessionEvent::AccountsReceived(accounts));
        } else if !self.session.borrow().is_connected() {
            return Ok(ConnectOutcome::Superseded);
        }

        self.observe_chain(provider).await?;
        if self.is_ready() {
            return Ok(ConnectOutcome::Ready);
        }
        if !self.session.borrow().is_connected() {
            return Ok(ConnectOutcome::Superseded);
        }

        let epoch = self.chain_epoch.get();
        let switched = self.switch_network(provider).await;
        let status = if switched.is_ok() { NetworkStatus::Correct } else { NetworkStatus::Incorrect };
        if self.chain_epoch.get() == epoch {
            self.apply(SessionEvent::NetworkSettled(status));
        } else {
            debug!(?status, "switch result superseded by chainChanged");
        }
        switched?;

        if self.is_ready() { Ok(ConnectOutcome::Ready) } else { Ok(ConnectOutcome::Superseded) }
    }

    /// Switch to the target; add it first when the wallet does not know it.
    async fn switch_network(&self, provider: &P) -> SessionResult<()> {
        let target = &self.config.target;
        info!(chain = %target.chain_id, "requesting network switch");
        let wrap = |source| SessionError::NetworkSwitch { chain: target.chain_name.clone(), source };
        match provider.request(RpcMethod::SwitchChain(target.chain_id)).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_unrecognized_chain() => {
                info!(chain = %target.chain_id, "chain unknown to wallet, adding it");
                provider.request(RpcMethod::AddChain(target.clone())).await.map(|_| ()).map_err(wrap)
            }
            Err(e) => Err(wrap(e)),
        }
    }

    fn report(&self, outcome: &ConnectOutcome) {
        match outcome {
            ConnectOutcome::Ready => {
                let label = self.display_account().unwrap_or_default();
                self.notices.emit(Notice::success(format!(
                    "Connected {} on {}",
                    label, self.config.target.chain_name
                )));
            }
            ConnectOutcome::WrongNetwork(e) => {
                warn!(error = %e, "network negotiation failed");
                self.notices.emit(Notice::error(format!(
                    "Please switch your wallet to {}.",
                    self.config.target.chain_name
                )));
            }
            ConnectOutcome::Cancelled => self.notices.emit(Notice::info(messages::CANCELLED)),
            ConnectOutcome::NoAccounts => self.notices.emit(Notice::error(messages::NO_ACCOUNTS)),
            ConnectOutcome::Failed(e) => {
                error!(error = %e, "wallet connection failed");
                self.notices.emit(Notice::error(messages::CONNECT_FAILED));
            }
            ConnectOutcome::Superseded => {
                debug!(state = ?self.snapshot(), "connect superseded by wallet event");
            }
            ConnectOutcome::AlreadyInProgress | ConnectOutcome::NoProvider => {}
        }
    }

    // =========================================================================
    // PUSH EVENTS
    // =========================================================================

    /// Apply one provider push. Bumps the matching epoch so in-flight
    /// `connect()` steps yield to it.
    pub fn handle_event(&self, event: ProviderEvent) {
        if self.torn_down.get() {
            return;
        }
        match event {
            ProviderEvent::AccountsChanged(raw) => match parse_account_list(&raw) {
                Ok(accounts) => {
                    self.account_epoch.set(self.account_epoch.get() + 1);
                    self.apply(SessionEvent::AccountsReceived(accounts));
                }
                Err(e) => {
                    warn!(error = %e, "ignoring accountsChanged");
                    self.notices.emit(Notice::error(messages::EVENT_FAILED));
                }
            },
            ProviderEvent::ChainChanged(raw) => match ChainId::parse(&raw) {
                Ok(chain) => {
                    self.chain_epoch.set(self.chain_epoch.get() + 1);
                    self.apply(SessionEvent::ChainObserved(chain));
                }
                Err(e) => {
                    warn!(error = %e, "ignoring chainChanged");
                    self.notices.emit(Notice::error(messages::EVENT_FAILED));
                }
            },
            ProviderEvent::Malformed { event, payload } => {
                warn!(event, %payload, "ignoring malformed wallet event");
                self.notices.emit(Notice::error(messages::EVENT_FAILED));
            }
        }
    }

    /// Apply every event already queued. Returns how many were applied.
    pub fn pump_events(&self) -> usize {
        let mut applied = 0;
        loop {
            let next = match self.events.borrow_mut().as_mut() {
                Some(rx) => rx.try_next().ok().flatten(),
                None => None,
            };
            match next {
                Some(event) => {
                    self.handle_event(event);
                    applied += 1;
                }
                None => return applied,
            }
        }
    }

    /// Drive push events until [`Self::teardown`] detaches the listeners.
    pub async fn run_events(&self) {
        let Some(mut rx) = self.events.borrow_mut().take() else {
            return;
        };
        while let Some(event) = rx.next().await {
            self.handle_event(event);
        }
        debug!("provider event stream closed");
    }

    /// Unmount: detach provider listeners. In-flight requests are not cancelled.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }
        if let Some(provider) = self.provider.as_ref() {
            provider.remove_all_listeners();
        }
        self.events.borrow_mut().take();
        debug!("session torn down");
    }
}

impl<P: Provider> Drop for SessionManager<P> {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn parse_accounts(value: Value) -> SessionResult<Vec<Address>> {
    let raw: Vec<String> = serde_json::from_value(value)?;
    Ok(parse_account_list(&raw)?)
}

fn parse_account_list(raw: &[String]) -> Result<Vec<Address>, crate::error::ParseError> {
    raw.iter().map(|a| Address::parse(a)).collect()
}

fn parse_chain(value: Value) -> SessionResult<ChainId> {
    match value {
        Value::String(s) => Ok(ChainId::parse(&s)?),
        Value::Number(n) => n
            .as_u64()
            .map(ChainId)
            .ok_or_else(|| SessionError::MalformedResponse(format!("chain id {}", n))),
        other => Err(SessionError::MalformedResponse(format!("chain id {}", other))),
    }
}
