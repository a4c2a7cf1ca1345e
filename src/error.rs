//! Error types. Each fault class the session distinguishes has its own variant.

use crate::core::methods::codes;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Malformed values coming back from the provider or from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid chain id: {0}")]
    ChainId(String),
    #[error("invalid address: {0}")]
    Address(String),
    #[error("invalid price token: {0} (expected USDC or USDT)")]
    PriceToken(String),
}

/// Rejection returned by `provider.request`, carrying the EIP-1193 code.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn user_rejected() -> Self { Self::new(codes::USER_REJECTED, "User rejected the request.") }

    pub fn unrecognized_chain() -> Self {
        Self::new(codes::UNRECOGNIZED_CHAIN, "Unrecognized chain ID. Try adding the chain first.")
    }

    pub fn is_user_rejected(&self) -> bool { self.code == codes::USER_REJECTED }
    pub fn is_unrecognized_chain(&self) -> bool { self.code == codes::UNRECOGNIZED_CHAIN }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Fault taxonomy of the wallet session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Permission prompt dismissed by the user.
    #[error("request rejected by user")]
    UserRejected,
    /// Switch (or add) to the target network failed.
    #[error("could not switch to {chain}: {source}")]
    NetworkSwitch { chain: String, source: ProviderError },
    #[error(transparent)]
    Provider(ProviderError),
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

impl From<ProviderError> for SessionError {
    fn from(e: ProviderError) -> Self {
        if e.is_user_rejected() { SessionError::UserRejected } else { SessionError::Provider(e) }
    }
}

impl From<ParseError> for SessionError {
    fn from(e: ParseError) -> Self { SessionError::MalformedResponse(e.to_string()) }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self { SessionError::MalformedResponse(e.to_string()) }
}

/// Issuer desk validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IssuerError {
    #[error("Please fill all required fields")]
    MissingFields(Vec<&'static str>),
    #[error("invalid {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("wallet not ready: connect and switch to the target network first")]
    NotReady,
    #[error("mint wizard is on step {0}")]
    WrongStep(u8),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config read {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config invalid: {0}")]
    Invalid(String),
}
