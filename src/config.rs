//! Session configuration - constructed by the host, optionally from a JSON file.
//!
//! ```json
//! {
//!   "target": { "chainId": "0xa869", "chainName": "...", "nativeCurrency": {...},
//!               "rpcUrls": [...], "blockExplorerUrls": [...] },
//!   "addressPrefix": 4,
//!   "addressSuffix": 4
//! }
//! ```

use crate::core::NetworkConfig;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Env var pointing at a JSON config file.
pub const CONFIG_ENV: &str = "RWA_NETWORK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Network the dashboard requires.
    pub target: NetworkConfig,
    /// Hex characters kept after `0x` in the short account label.
    pub address_prefix: usize,
    /// Hex characters kept at the end of the short account label.
    pub address_suffix: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { target: NetworkConfig::avalanche_fuji(), address_prefix: 4, address_suffix: 4 }
    }
}

impl SessionConfig {
    pub fn with_target(mut self, target: NetworkConfig) -> Self { self.target = target; self }
    pub fn with_truncation(mut self, prefix: usize, suffix: usize) -> Self {
        self.address_prefix = prefix;
        self.address_suffix = suffix;
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json(&raw)
    }

    /// Load from `RWA_NETWORK_CONFIG` when set, defaults otherwise.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target.rpc_urls.is_empty() {
            return Err(ConfigError::Invalid("target.rpcUrls must not be empty".into()));
        }
        if self.target.chain_name.trim().is_empty() {
            return Err(ConfigError::Invalid("target.chainName must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ChainId;
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use tempfile::TempDir;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    #[test]
    fn test_defaults_target_fuji() {
        let config = SessionConfig::default();
        assert_eq!(config.target.chain_id, ChainId::AVALANCHE_FUJI);
        assert_eq!((config.address_prefix, config.address_suffix), (4, 4));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = SessionConfig::from_json(r#"{"addressPrefix": 6}"#).unwrap();
        assert_eq!(config.address_prefix, 6);
        assert_eq!(config.address_suffix, 4);
        assert_eq!(config.target, NetworkConfig::avalanche_fuji());
    }

    #[test]
    fn test_rejects_empty_rpc_list() {
        let mut target = serde_json::to_value(NetworkConfig::avalanche_fuji()).unwrap();
        target["rpcUrls"] = serde_json::json!([]);
        let raw = serde_json::json!({ "target": target }).to_string();
        assert!(matches!(SessionConfig::from_json(&raw), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_env_reads_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|p| p.into_inner());
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("network.json");
        let mut target = NetworkConfig::avalanche_fuji();
        target.chain_id = ChainId(43114);
        target.chain_name = "Avalanche C-Chain".into();
        std::fs::write(&path, serde_json::json!({ "target": target }).to_string()).unwrap();

        std::env::set_var(CONFIG_ENV, &path);
        let config = SessionConfig::from_env().expect("config");
        std::env::remove_var(CONFIG_ENV);

        assert_eq!(config.target.chain_id, ChainId(43114));
        assert_eq!(config.target.chain_name, "Avalanche C-Chain");
    }

    #[test]
    fn test_from_file_missing() {
        let err = SessionConfig::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
