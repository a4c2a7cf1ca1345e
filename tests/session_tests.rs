//! Session Test Suite: wallet session against a scripted wallet
//!
//! Covers:
//! 1. Mount without a provider
//! 2. Silent hydration at mount
//! 3. connect() serialization and network negotiation (switch, add, failures)
//! 4. Push events (accountsChanged / chainChanged)
//! 5. Push events winning races with an in-flight connect()
//! 6. Teardown and release of the event task

use futures::channel::mpsc::UnboundedReceiver;
use rwa_wallet::core::methods::rpc;
use rwa_wallet::{
    ChainId, ConnectOutcome, ConnectionState, MockProvider, NetworkConfig, NetworkStatus, Notice, NoticeLevel,
    ProviderError, ProviderEvent, RpcMethod, SessionConfig, SessionError, SessionManager,
};
use std::rc::Rc;

const ALICE: &str = "0xABCD000000000000000000000000000000001234";
const BOB: &str = "0x00000000000000000000000000000000000b0b00";
const FUJI: ChainId = ChainId::AVALANCHE_FUJI;
const MAINNET: ChainId = ChainId(1);

fn mount(wallet: &MockProvider) -> SessionManager<MockProvider> {
    SessionManager::new(Some(wallet.clone()), SessionConfig::default())
}

fn drain(rx: &mut UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(Some(notice)) = rx.try_next() {
        out.push(notice);
    }
    out
}

// =============================================================================
// 1. NO PROVIDER
// =============================================================================

#[tokio::test]
async fn no_provider_finishes_loading_and_stays_disconnected() {
    let manager: SessionManager<MockProvider> = SessionManager::new(None, SessionConfig::default());
    let mut notices = manager.subscribe_notices();
    assert!(manager.is_initial_loading());

    manager.initialize().await;
    assert!(!manager.is_initial_loading());
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert_eq!(manager.session().network(), NetworkStatus::Unknown);

    assert_eq!(manager.connect().await, ConnectOutcome::NoProvider);
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert!(!manager.is_connecting());

    // Environment fault is reported once.
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);

    manager.teardown();
}

// =============================================================================
// 2. HYDRATION
// =============================================================================

#[tokio::test]
async fn hydration_with_authorized_account_on_wrong_chain() {
    let wallet = MockProvider::new().with_authorized(&[ALICE, BOB]).with_chain(MAINNET);
    let manager = mount(&wallet);
    manager.initialize().await;

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.connection_state, ConnectionState::Connected);
    assert_eq!(snapshot.account.as_deref(), Some(ALICE));
    assert_eq!(snapshot.display_account.as_deref(), Some("0xABCD…1234"));
    assert_eq!(snapshot.network, NetworkStatus::Incorrect);
    assert!(!snapshot.is_initial_loading);
    assert!(!snapshot.is_ready);

    // Silent query only: no prompt, no switch.
    assert_eq!(wallet.calls(), vec![RpcMethod::Accounts, RpcMethod::ChainId]);
}

#[tokio::test]
async fn hydration_without_accounts_stays_disconnected() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]);
    let manager = mount(&wallet);
    manager.initialize().await;

    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert!(!manager.is_initial_loading());
    assert_eq!(wallet.call_count(rpc::REQUEST_ACCOUNTS), 0);
    assert_eq!(wallet.call_count(rpc::CHAIN_ID), 0);
}

#[tokio::test]
async fn hydration_failure_still_clears_loading_once() {
    let wallet = MockProvider::new().failing(rpc::ACCOUNTS, ProviderError::new(-32603, "boom"));
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();

    manager.initialize().await;
    manager.initialize().await;

    assert!(!manager.is_initial_loading());
    assert_eq!(wallet.call_count(rpc::ACCOUNTS), 1);
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

// =============================================================================
// 3. CONNECT
// =============================================================================

#[tokio::test]
async fn scenario_hydrate_then_switch() {
    let wallet = MockProvider::new()
        .with_authorized(&[ALICE])
        .with_chain(MAINNET)
        .with_known_chain(FUJI);
    let manager = mount(&wallet);

    manager.initialize().await;
    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Connected, NetworkStatus::Incorrect));
    assert_eq!(manager.display_account().as_deref(), Some("0xABCD…1234"));

    assert_eq!(manager.connect().await, ConnectOutcome::Ready);
    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Connected, NetworkStatus::Correct));
    assert!(manager.is_ready());
    assert_eq!(wallet.call_count(rpc::SWITCH_CHAIN), 1);
    assert_eq!(wallet.call_count(rpc::ADD_CHAIN), 0);

    // The wallet's chainChanged confirms the switch.
    assert_eq!(manager.pump_events(), 1);
    assert!(manager.is_ready());
}

#[tokio::test]
async fn connect_on_target_chain_makes_no_switch() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    assert_eq!(manager.connect().await, ConnectOutcome::Ready);
    assert_eq!(manager.session().network(), NetworkStatus::Correct);
    assert_eq!(wallet.call_count(rpc::SWITCH_CHAIN), 0);
    assert_eq!(wallet.call_count(rpc::ADD_CHAIN), 0);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
}

#[tokio::test]
async fn concurrent_connect_makes_one_permission_request() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    let gate = wallet.hold(rpc::REQUEST_ACCOUNTS);
    let (first, second, _) = tokio::join!(manager.connect(), manager.connect(), async {
        assert!(manager.is_connecting());
        assert_eq!(manager.session().connection(), ConnectionState::Connecting);
        gate.release();
    });

    assert_eq!(first, ConnectOutcome::Ready);
    assert_eq!(second, ConnectOutcome::AlreadyInProgress);
    assert_eq!(wallet.call_count(rpc::REQUEST_ACCOUNTS), 1);
    assert!(!manager.is_connecting());
}

#[tokio::test]
async fn unrecognized_chain_is_added() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(MAINNET);
    let manager = mount(&wallet);
    manager.initialize().await;

    assert_eq!(manager.connect().await, ConnectOutcome::Ready);
    assert_eq!(manager.session().network(), NetworkStatus::Correct);

    let calls = wallet.calls();
    let names: Vec<&str> = calls.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec![rpc::ACCOUNTS, rpc::REQUEST_ACCOUNTS, rpc::CHAIN_ID, rpc::SWITCH_CHAIN, rpc::ADD_CHAIN]);
    assert_eq!(calls.last(), Some(&RpcMethod::AddChain(NetworkConfig::avalanche_fuji())));
}

#[tokio::test]
async fn failed_add_chain_leaves_incorrect() {
    let wallet = MockProvider::new()
        .with_wallet_accounts(&[ALICE])
        .failing(rpc::ADD_CHAIN, ProviderError::new(-32602, "bad rpc url"));
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    let outcome = manager.connect().await;
    assert!(matches!(
        outcome,
        ConnectOutcome::WrongNetwork(SessionError::NetworkSwitch { source: ProviderError { code: -32602, .. }, .. })
    ));
    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Connected, NetworkStatus::Incorrect));
    assert!(!manager.is_connecting());

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn switch_failure_other_than_unrecognized_is_recoverable() {
    let wallet = MockProvider::new()
        .with_wallet_accounts(&[ALICE])
        .failing(rpc::SWITCH_CHAIN, ProviderError::new(-32002, "request already pending"));
    let manager = mount(&wallet);
    manager.initialize().await;

    assert!(matches!(manager.connect().await, ConnectOutcome::WrongNetwork(_)));
    assert_eq!(wallet.call_count(rpc::ADD_CHAIN), 0);
    assert_eq!(manager.session().network(), NetworkStatus::Incorrect);

    // User retries; the switch is tried again.
    assert!(matches!(manager.connect().await, ConnectOutcome::WrongNetwork(_)));
    assert_eq!(wallet.call_count(rpc::SWITCH_CHAIN), 2);
}

#[tokio::test]
async fn rejected_prompt_is_a_cancel() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).rejecting_prompt();
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    assert_eq!(manager.connect().await, ConnectOutcome::Cancelled);
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert!(!manager.is_connecting());
    assert_eq!(wallet.call_count(rpc::CHAIN_ID), 0);

    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Info);
}

#[tokio::test]
async fn unexpected_error_is_surfaced_generically() {
    let wallet = MockProvider::new()
        .with_wallet_accounts(&[ALICE])
        .failing(rpc::CHAIN_ID, ProviderError::new(-32603, "internal"));
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    assert!(matches!(manager.connect().await, ConnectOutcome::Failed(SessionError::Provider(_))));
    // Accounts were granted before the failure.
    assert_eq!(manager.session().connection(), ConnectionState::Connected);
    assert!(!manager.is_connecting());
    assert_eq!(drain(&mut notices)[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn no_accounts_returns_to_disconnected() {
    let wallet = MockProvider::new();
    let manager = mount(&wallet);
    manager.initialize().await;

    assert_eq!(manager.connect().await, ConnectOutcome::NoAccounts);
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert!(manager.session().account().is_none());
}

#[tokio::test]
async fn no_accounts_from_connected_drops_old_account() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;
    assert!(manager.is_ready());

    // The wallet revoked every account; the next prompt grants none.
    let _ = wallet.clone().with_wallet_accounts(&[]);
    assert_eq!(manager.connect().await, ConnectOutcome::NoAccounts);

    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Disconnected, NetworkStatus::Unknown));
    assert!(manager.display_account().is_none());
    assert!(!manager.is_connecting());
    assert_eq!(drain(&mut notices)[0].level, NoticeLevel::Error);
}

// =============================================================================
// 4. PUSH EVENTS
// =============================================================================

#[tokio::test]
async fn empty_accounts_changed_resets_from_any_state() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;
    assert!(manager.is_ready());

    wallet.push(ProviderEvent::AccountsChanged(vec![]));
    manager.pump_events();
    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Disconnected, NetworkStatus::Unknown));
    assert!(s.account().is_none());

    // Already disconnected: still (Disconnected, Unknown).
    wallet.push(ProviderEvent::AccountsChanged(vec![]));
    manager.pump_events();
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn accounts_changed_swaps_account_keeps_network() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    wallet.push(ProviderEvent::AccountsChanged(vec![BOB.into()]));
    assert_eq!(manager.pump_events(), 1);
    let s = manager.session();
    assert_eq!(s.account().map(|a| a.as_str()), Some(BOB));
    assert_eq!(s.network(), NetworkStatus::Correct);
}

#[tokio::test]
async fn chain_changed_only_touches_network() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    wallet.push(ProviderEvent::ChainChanged("0x1".into()));
    manager.pump_events();
    let s = manager.session();
    assert_eq!(s.connection(), ConnectionState::Connected);
    assert_eq!(s.account().map(|a| a.as_str()), Some(ALICE));
    assert_eq!(s.network(), NetworkStatus::Incorrect);

    wallet.push(ProviderEvent::ChainChanged("0xA869".into()));
    manager.pump_events();
    assert!(manager.is_ready());
}

#[tokio::test]
async fn accounts_changed_while_disconnected_connects_without_network() {
    let wallet = MockProvider::new().with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);

    wallet.push(ProviderEvent::AccountsChanged(vec![BOB.into()]));
    manager.pump_events();
    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Connected, NetworkStatus::Unknown));
    assert_eq!(s.account().map(|a| a.as_str()), Some(BOB));
    assert!(!manager.is_ready());
    // Nothing is re-read from the wallet.
    assert_eq!(wallet.call_count(rpc::CHAIN_ID), 0);
}

#[tokio::test]
async fn chain_changed_while_disconnected_stays_disconnected() {
    let wallet = MockProvider::new();
    let manager = mount(&wallet);
    manager.initialize().await;

    wallet.push(ProviderEvent::ChainChanged("0x1".into()));
    manager.pump_events();
    let s = manager.session();
    assert_eq!(s.connection(), ConnectionState::Disconnected);
    assert!(s.account().is_none());
}

#[tokio::test]
async fn malformed_push_is_reported_not_applied() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    wallet.push(ProviderEvent::ChainChanged("avalanche".into()));
    manager.pump_events();
    assert!(manager.is_ready());
    assert_eq!(drain(&mut notices)[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn badly_shaped_payloads_leave_a_ready_session_alone() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    let mut notices = manager.subscribe_notices();
    manager.initialize().await;

    for (name, payload) in [
        ("accountsChanged", serde_json::json!(null)),
        ("accountsChanged", serde_json::json!([42])),
        ("chainChanged", serde_json::json!(43113)),
    ] {
        let event = ProviderEvent::from_raw(name, &payload).expect("known event");
        wallet.push(event);
    }
    assert_eq!(manager.pump_events(), 3);

    let s = manager.session();
    assert_eq!((s.connection(), s.network()), (ConnectionState::Connected, NetworkStatus::Correct));
    assert_eq!(s.account().map(|a| a.as_str()), Some(ALICE));
    let notices = drain(&mut notices);
    assert_eq!(notices.len(), 3);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn run_events_applies_pushes_until_teardown() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    tokio::join!(manager.run_events(), async {
        wallet.push(ProviderEvent::ChainChanged("0x1".into()));
        while manager.session().network() != NetworkStatus::Incorrect {
            tokio::task::yield_now().await;
        }
        manager.teardown();
    });
    assert_eq!(wallet.listener_count(), 0);
}

// =============================================================================
// 5. RACES: PUSH WINS
// =============================================================================

#[tokio::test]
async fn chain_change_during_chain_read_wins() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    // connect() reads 0xa869, but the user switched to mainnet while the read was in flight.
    let gate = wallet.hold(rpc::CHAIN_ID);
    let (outcome, _) = tokio::join!(manager.connect(), async {
        manager.handle_event(ProviderEvent::ChainChanged("0x1".into()));
        gate.release();
    });

    // The stale read is dropped, so connect() goes on to correct the network.
    assert_eq!(outcome, ConnectOutcome::Ready);
    assert_eq!(wallet.call_count(rpc::SWITCH_CHAIN), 1);
}

#[tokio::test]
async fn chain_change_during_switch_wins() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(MAINNET).with_known_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    let gate = wallet.hold(rpc::SWITCH_CHAIN);
    let (outcome, _) = tokio::join!(manager.connect(), async {
        // User picks yet another chain in the wallet UI mid-switch.
        manager.handle_event(ProviderEvent::ChainChanged("0x89".into()));
        gate.release();
    });

    // The switch's own Correct write is dropped; the pushed chain stands.
    assert_eq!(outcome, ConnectOutcome::Superseded);
    assert_eq!(manager.session().network(), NetworkStatus::Incorrect);

    // The wallet then reports the switch landing.
    manager.pump_events();
    assert!(manager.is_ready());
}

#[tokio::test]
async fn disconnect_during_prompt_wins() {
    let wallet = MockProvider::new().with_wallet_accounts(&[ALICE]).with_chain(FUJI);
    let manager = mount(&wallet);
    manager.initialize().await;

    let gate = wallet.hold(rpc::REQUEST_ACCOUNTS);
    let (outcome, _) = tokio::join!(manager.connect(), async {
        manager.handle_event(ProviderEvent::AccountsChanged(vec![]));
        gate.release();
    });

    assert_eq!(outcome, ConnectOutcome::Superseded);
    assert_eq!(manager.session().connection(), ConnectionState::Disconnected);
    assert_eq!(wallet.call_count(rpc::CHAIN_ID), 0);
    assert!(!manager.is_connecting());
}

// =============================================================================
// 6. TEARDOWN
// =============================================================================

#[tokio::test]
async fn teardown_detaches_listeners() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    {
        let manager = mount(&wallet);
        manager.initialize().await;
        assert_eq!(wallet.listener_count(), 1);
    }
    // Dropping the manager is an unmount.
    assert_eq!(wallet.listener_count(), 0);
}

#[tokio::test]
async fn teardown_ends_spawned_event_task() {
    let wallet = MockProvider::new().with_authorized(&[ALICE]).with_chain(FUJI);
    let manager = Rc::new(mount(&wallet));
    let local = tokio::task::LocalSet::new();

    local
        .run_until(async {
            let events = manager.clone();
            let task = tokio::task::spawn_local(async move { events.run_events().await });
            tokio::task::yield_now().await;
            assert_eq!(Rc::strong_count(&manager), 2);

            manager.teardown();
            task.await.expect("event task");
            // The task's handle is gone, so dropping the last one unmounts.
            assert_eq!(Rc::strong_count(&manager), 1);
        })
        .await;
    assert_eq!(wallet.listener_count(), 0);
}
