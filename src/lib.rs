//! rwa-wallet: wallet session and issuer desk for an RWA tokenization marketplace.
//!
//! # Architecture
//!
//! ```text
//! Host view (browser page or CLI)
//!   │
//!   ├── SessionManager ── connection × network state, notices
//!   │     │
//!   │     └── Provider (trait)
//!   │           ├── InjectedProvider  window.ethereum   (wasm)
//!   │           └── MockProvider      scripted wallet   (tests, CLI)
//!   │
//!   └── Issuer desk ── NftMintWizard / FtMintForm / ListingForm
//!                      (simulated, requires a ready session)
//! ```
//!
//! # Readiness
//!
//! | Connection | Network | Dashboard |
//! |------------|---------|-----------|
//! | Connected | Correct | unlocked |
//! | anything else | | connect / switch prompt |
//!
//! # Features
//!
//! - `native` - tracing subscriber, tokio (CLI and tests)
//! - `wasm` - browser bindings over the injected provider
//!
//! # Usage
//!
//! ```ignore
//! use rwa_wallet::{MockProvider, SessionConfig, SessionManager, ConnectOutcome};
//!
//! let manager = SessionManager::new(Some(MockProvider::new()), SessionConfig::default());
//! manager.initialize().await;
//! if manager.connect().await == ConnectOutcome::Ready {
//!     println!("{}", manager.display_account().unwrap());
//! }
//! manager.teardown();
//! ```

// =============================================================================
// Shared modules (compile everywhere)
// =============================================================================
pub mod config;
pub mod core;
pub mod error;
pub mod issuer;
pub mod provider;
pub mod session;

// =============================================================================
// Native-only modules
// =============================================================================
#[cfg(feature = "native")]
pub mod logging;

// =============================================================================
// WASM-only modules (browser, wasm-bindgen)
// =============================================================================
#[cfg(feature = "wasm")]
pub mod wasm;

// =============================================================================
// Re-exports
// =============================================================================
pub use config::SessionConfig;
pub use crate::core::{Address, ChainId, NetworkConfig, NetworkStatus};
pub use error::{ConfigError, IssuerError, ProviderError, SessionError};
pub use issuer::{AssetKind, AssetType, FtMintForm, ListingForm, MintedAsset, NftMintWizard, PriceToken};
pub use provider::{MockProvider, Provider, ProviderEvent, RpcMethod};
pub use session::{ConnectOutcome, ConnectionState, Notice, NoticeLevel, Session, SessionManager, SessionSnapshot};

#[cfg(feature = "wasm")]
pub use wasm::{InjectedProvider, WasmSession};
