//! Account addresses as reported by the provider.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;

const HEX_LEN: usize = 40;

/// A 20-byte account address. Keeps the provider's casing for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        let value = value.trim();
        let body = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| ParseError::Address(value.to_string()))?;
        if body.len() != HEX_LEN || hex::decode(body).is_err() {
            return Err(ParseError::Address(value.to_string()));
        }
        Ok(Self(format!("0x{}", body)))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    /// `0xABCD…1234` style label.
    pub fn display_short(&self, prefix: usize, suffix: usize) -> String {
        truncate_address(&self.0, prefix, suffix)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl TryFrom<String> for Address {
    type Error = ParseError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::parse(&value) }
}

impl From<Address> for String {
    fn from(value: Address) -> Self { value.0 }
}

/// Keep `0x` plus `prefix` leading and `suffix` trailing characters.
/// Inputs too short to shorten come back unchanged.
pub fn truncate_address(address: &str, prefix: usize, suffix: usize) -> String {
    let body = address.strip_prefix("0x").unwrap_or(address);
    let lead = if body.len() == address.len() { "" } else { "0x" };
    if !body.is_ascii() || body.len() <= prefix + suffix {
        return address.to_string();
    }
    format!("{}{}…{}", lead, &body[..prefix], &body[body.len() - suffix..])
}
