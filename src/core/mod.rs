//! Core types shared by every platform: chain ids, network descriptors,
//! address display and the provider vocabulary.

pub mod address;
pub mod chain;
pub mod methods;

pub use address::{truncate_address, Address};
pub use chain::{ChainId, NativeCurrency, NetworkConfig, NetworkStatus};
