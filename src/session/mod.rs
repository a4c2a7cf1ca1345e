//! Wallet session: connection × network state for the issuer dashboard.
//!
//! # Flow
//!
//! ```text
//! mount ──► SessionManager::new ──► subscribe(accountsChanged, chainChanged)
//!              │
//!              ├── initialize()      eth_accounts → eth_chainId        (silent)
//!              │
//!              ├── connect()         eth_requestAccounts → eth_chainId
//!              │                       └─ wrong chain → switch ─(4902)→ add
//!              │
//!              ├── run_events()      push events ──► Session::apply
//!              │
//! unmount ──► teardown()            removeAllListeners
//! ```
//!
//! Only (Connected, Correct) counts as ready.

mod manager;
mod notice;
mod state;

pub use manager::{ConnectOutcome, SessionManager};
pub use notice::{Notice, NoticeLevel};
pub use state::{ConnectionState, Session, SessionEvent, SessionSnapshot};
