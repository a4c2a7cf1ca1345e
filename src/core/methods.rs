//! Method and event name constants for the injected provider
//!
//! Centralized registry for every EIP-1193 string the crate speaks.

/// JSON-RPC methods sent through `provider.request`
pub mod rpc {
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
}

/// Push events delivered through `provider.on`
pub mod events {
    pub const ACCOUNTS_CHANGED: &str = "accountsChanged";
    pub const CHAIN_CHANGED: &str = "chainChanged";

    pub const ALL: &[&str] = &[ACCOUNTS_CHANGED, CHAIN_CHANGED];
}

/// Provider error codes (EIP-1193 / EIP-3326)
pub mod codes {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
}
