//! Chain ids and the network descriptor handed to `wallet_addEthereumChain`.

use crate::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Numeric chain identifier. Providers report it hex-encoded (`"0xa869"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Avalanche Fuji C-Chain (43113).
    pub const AVALANCHE_FUJI: ChainId = ChainId(0xA869);

    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parse `0x`-prefixed hex (any case) or plain decimal.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let value = value.trim();
        let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
            Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16),
            Some(_) => return Err(ParseError::ChainId(value.to_string())),
            None => value.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|_| ParseError::ChainId(value.to_string()))
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl FromStr for ChainId {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::parse(s) }
}

impl Serialize for ChainId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw { Number(u64), Text(String) }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(ChainId(n)),
            Raw::Text(s) => ChainId::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Whether the wallet sits on the target network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkStatus {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

impl NetworkStatus {
    pub fn evaluate(reported: ChainId, target: ChainId) -> Self {
        if reported == target { NetworkStatus::Correct } else { NetworkStatus::Incorrect }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkStatus::Unknown => "unknown",
            NetworkStatus::Correct => "correct",
            NetworkStatus::Incorrect => "incorrect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 chain descriptor, passed verbatim to the add-chain request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl NetworkConfig {
    pub fn avalanche_fuji() -> Self {
        Self {
            chain_id: ChainId::AVALANCHE_FUJI,
            chain_name: "Avalanche Fuji C-Chain".into(),
            native_currency: NativeCurrency { name: "Avalanche".into(), symbol: "AVAX".into(), decimals: 18 },
            rpc_urls: vec!["https://api.avax-test.network/ext/bc/C/rpc".into()],
            block_explorer_urls: vec!["https://testnet.snowtrace.io".into()],
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self { Self::avalanche_fuji() }
}
